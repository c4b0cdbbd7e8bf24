//! Schluessel-Ableitung pro Nachricht (HKDF-SHA256)
//!
//! AES-Schluessel und IV eines verschluesselten Pakets werden nie
//! uebertragen. Beide Seiten leiten sie ab aus:
//!
//! ```text
//! IKM  = Langzeit-Schluessel (ueber den Fingerprint gefunden)
//! Salt = ephemerer Nachrichten-Schluessel (16 Zufallsbytes im Paket)
//! Info = "lncf-kdf-v1" || Fingerprint
//!
//! OKM (32 Bytes) = AES-128-Schluessel (16) || IV (16)
//! ```
//!
//! Der Salt ist pro Paket frisch, daher ist auch der IV pro Nachricht
//! unvorhersagbar, obwohl der Langzeit-Schluessel beliebig lange lebt.
//! Aus einem abgeleiteten Schluessel laesst sich weder der Langzeit-Schluessel
//! noch das Material anderer Nachrichten zurueckrechnen.

use hkdf::Hkdf;
use sha2::Sha256;

use lncf_core::{KeyFingerprint, LncfError, Result};

use crate::types::{MessageKeys, SecretBytes};
use crate::{AES_BLOCK_SIZE, DERIVED_KEY_SIZE};

/// Domain-Separation fuer die Info-Eingabe von HKDF
pub const KDF_INFO_PREFIX: &[u8] = b"lncf-kdf-v1";

/// Leitet AES-Schluessel und IV fuer eine einzelne Nachricht ab
///
/// # Parameter
/// - `long_term_key`: Registrierter Schluessel hinter `fingerprint`
/// - `message_key`: Ephemerer Nachrichten-Schluessel aus dem Paket
/// - `fingerprint`: Bindet die Ausgabe an die Schluessel-Identitaet
pub fn derive_message_keys(
    long_term_key: &[u8],
    message_key: &[u8],
    fingerprint: &KeyFingerprint,
) -> Result<MessageKeys> {
    let hk = Hkdf::<Sha256>::new(Some(message_key), long_term_key);

    let mut info = Vec::with_capacity(KDF_INFO_PREFIX.len() + fingerprint.as_bytes().len());
    info.extend_from_slice(KDF_INFO_PREFIX);
    info.extend_from_slice(fingerprint.as_bytes());

    let mut okm = [0u8; DERIVED_KEY_SIZE + AES_BLOCK_SIZE];
    hk.expand(&info, &mut okm)
        .map_err(|e| LncfError::KeyDerivation(e.to_string()))?;

    let aes_key = SecretBytes::from_slice(&okm[..DERIVED_KEY_SIZE]);
    let mut iv = [0u8; AES_BLOCK_SIZE];
    iv.copy_from_slice(&okm[DERIVED_KEY_SIZE..]);

    okm.iter_mut().for_each(|b| *b = 0);

    Ok(MessageKeys { aes_key, iv })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(c: char) -> KeyFingerprint {
        KeyFingerprint::new(c.to_string().repeat(KeyFingerprint::SIZE))
    }

    #[test]
    fn ableitung_ist_deterministisch() {
        let a = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('A')).unwrap();
        let b = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('A')).unwrap();
        assert_eq!(a.aes_key, b.aes_key);
        assert_eq!(a.iv, b.iv);
        assert_eq!(a.aes_key.len(), DERIVED_KEY_SIZE);
    }

    #[test]
    fn anderer_nachrichten_schluessel_anderes_material() {
        let a = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('A')).unwrap();
        let b = derive_message_keys(&[0x42; 16], &[0x02; 16], &fp('A')).unwrap();
        assert_ne!(a.aes_key, b.aes_key);
        assert_ne!(a.iv, b.iv);
    }

    #[test]
    fn anderer_langzeit_schluessel_anderes_material() {
        let a = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('A')).unwrap();
        let b = derive_message_keys(&[0x43; 16], &[0x01; 16], &fp('A')).unwrap();
        assert_ne!(a.aes_key, b.aes_key);
    }

    #[test]
    fn fingerprint_fliesst_in_die_ableitung() {
        let a = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('A')).unwrap();
        let b = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('B')).unwrap();
        assert_ne!(a.aes_key, b.aes_key);
    }

    #[test]
    fn schluessel_und_iv_sind_verschieden() {
        let keys = derive_message_keys(&[0x42; 16], &[0x01; 16], &fp('A')).unwrap();
        assert_ne!(keys.aes_key.as_bytes(), &keys.iv[..]);
    }
}
