//! HMAC-SHA256 ueber rohe Schluessel
//!
//! Die fingerprint-basierten Varianten liegen in `KeyRegistry`; hier nur
//! die Rechenkerne.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use lncf_core::{LncfError, Result};

use crate::HMAC_TAG_SIZE;

type HmacSha256 = Hmac<Sha256>;

fn mac_fuer(key: &[u8]) -> Result<HmacSha256> {
    <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| LncfError::KeyDerivation(format!("HMAC-Schluessel abgelehnt: {e}")))
}

/// Berechnet HMAC-SHA256 ueber `message`
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; HMAC_TAG_SIZE]> {
    let mut mac = mac_fuer(key)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Prueft einen Tag in konstanter Zeit
pub fn verify_tag(key: &[u8], message: &[u8], tag: &[u8]) -> bool {
    let Ok(mut mac) = mac_fuer(key) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_testfall_2() {
        let tag = hmac_sha256(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(tag[0], 0x5B);
        assert_eq!(tag[1], 0xDC);
        assert_eq!(tag[31], 0x43);
    }

    #[test]
    fn verify_echter_tag() {
        let tag = hmac_sha256(b"schluessel", b"nachricht").unwrap();
        assert!(verify_tag(b"schluessel", b"nachricht", &tag));
    }

    #[test]
    fn verify_falscher_schluessel_oder_tag() {
        let tag = hmac_sha256(b"schluessel", b"nachricht").unwrap();
        assert!(!verify_tag(b"anderer", b"nachricht", &tag));
        assert!(!verify_tag(b"schluessel", b"nachrichT", &tag));
        assert!(!verify_tag(b"schluessel", b"nachricht", &tag[..31]));
    }

    #[test]
    fn leere_und_lange_schluessel_sind_gueltig() {
        let leer = hmac_sha256(b"", b"nachricht").unwrap();
        assert!(verify_tag(b"", b"nachricht", &leer));

        // Laenger als ein SHA-256-Block, wird intern gehasht
        let lang = [0xAAu8; 131];
        let tag = hmac_sha256(&lang, b"nachricht").unwrap();
        assert!(verify_tag(&lang, b"nachricht", &tag));
        assert_ne!(tag, leer);
    }
}
