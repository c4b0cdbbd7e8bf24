//! Zustandslose Primitiven: CRC32, SHA-1, SHA-256, Base64

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use lncf_core::Result;

/// CRC-32 (IEEE) ueber die gesamten Bytes
///
/// Billiges Integritaets-Gate vor jedem weiteren Parsing. Im Paket steht
/// der Wert big-endian in den letzten 4 Bytes.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// SHA-1 Digest (20 Bytes)
pub fn sha1(data: &[u8]) -> [u8; 20] {
    Sha1::digest(data).into()
}

/// SHA-256 Digest (32 Bytes)
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Base64 (Standard-Alphabet, mit Padding)
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Dekodiert Base64 (Standard-Alphabet, mit Padding)
pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_bekannter_wert() {
        // Pruefwert aus der CRC-32/ISO-HDLC Spezifikation
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn crc32_deterministisch() {
        let data = b"lncf paket";
        assert_eq!(crc32(data), crc32(data));
    }

    #[test]
    fn crc32_erkennt_jeden_einzelnen_bitfehler() {
        let original = b"temp\x00\x0423.5 irgendein laengerer inhalt".to_vec();
        let referenz = crc32(&original);
        for byte in 0..original.len() {
            for bit in 0..8 {
                let mut kaputt = original.clone();
                kaputt[byte] ^= 1 << bit;
                assert_ne!(crc32(&kaputt), referenz, "Bitfehler an {byte}:{bit} unerkannt");
            }
        }
    }

    #[test]
    fn sha256_bekannter_wert() {
        let digest = sha256(b"abc");
        assert_eq!(digest[0], 0xBA);
        assert_eq!(digest[1], 0x78);
        assert_eq!(digest[31], 0xAD);
    }

    #[test]
    fn sha1_bekannter_wert() {
        let digest = sha1(b"abc");
        assert_eq!(digest.len(), 20);
        assert_eq!(digest[0], 0xA9);
        assert_eq!(digest[19], 0x9D);
    }

    #[test]
    fn base64_roundtrip() {
        let data = [0u8, 1, 2, 250, 255];
        let text = base64_encode(&data);
        assert_eq!(base64_decode(&text).unwrap(), data);
    }

    #[test]
    fn base64_ungueltig() {
        assert!(base64_decode("kein base64!").is_err());
    }

    #[test]
    fn base64_ignoriert_whitespace_am_rand() {
        assert_eq!(base64_decode("  AQID\n").unwrap(), vec![1, 2, 3]);
    }
}
