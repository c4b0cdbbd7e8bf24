//! AES-CBC ohne implizites Padding
//!
//! Der Aufrufer muss den Klartext selbst auf die Blockgroesse bringen
//! (siehe inneres Frame-Format im Protokoll-Crate). Unterstuetzt werden
//! AES-128, AES-192 und AES-256, abhaengig von der Schluessellaenge.

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};

use lncf_core::{LncfError, Result};

use crate::AES_BLOCK_SIZE;

/// Verschluesselt einen blockbuendigen Klartext mit AES-CBC
///
/// # Fehler
/// - `InvalidLength` wenn `plaintext.len()` kein Vielfaches von 16 ist
/// - `UngueltigeSchluesselLaenge` bei Schluesseln ausser 16/24/32 Bytes
pub fn aes_cbc_encrypt(
    key: &[u8],
    iv: &[u8; AES_BLOCK_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    if plaintext.len() % AES_BLOCK_SIZE != 0 {
        return Err(LncfError::InvalidLength {
            laenge: plaintext.len(),
            blockgroesse: AES_BLOCK_SIZE,
        });
    }

    let ciphertext = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| schluessel_fehler(key))?
            .encrypt_padded_vec_mut::<NoPadding>(plaintext),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| schluessel_fehler(key))?
            .encrypt_padded_vec_mut::<NoPadding>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| schluessel_fehler(key))?
            .encrypt_padded_vec_mut::<NoPadding>(plaintext),
        _ => return Err(schluessel_fehler(key)),
    };

    Ok(ciphertext)
}

/// Entschluesselt einen AES-CBC-Ciphertext
///
/// Der Ciphertext muss ein nicht-leeres Vielfaches der Blockgroesse sein;
/// alles andere wird abgelehnt bevor die Chiffre laeuft.
pub fn aes_cbc_decrypt(
    key: &[u8],
    iv: &[u8; AES_BLOCK_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(LncfError::InvalidLength {
            laenge: ciphertext.len(),
            blockgroesse: AES_BLOCK_SIZE,
        });
    }

    let laenge_fehler = |_| LncfError::InvalidLength {
        laenge: ciphertext.len(),
        blockgroesse: AES_BLOCK_SIZE,
    };

    match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| schluessel_fehler(key))?
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(laenge_fehler),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| schluessel_fehler(key))?
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(laenge_fehler),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| schluessel_fehler(key))?
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .map_err(laenge_fehler),
        _ => Err(schluessel_fehler(key)),
    }
}

fn schluessel_fehler(key: &[u8]) -> LncfError {
    LncfError::UngueltigeSchluesselLaenge {
        erhalten: key.len(),
    }
}
