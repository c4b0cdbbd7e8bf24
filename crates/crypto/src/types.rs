//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use crate::AES_BLOCK_SIZE;

/// Sicherer Schluessel-Container (wird beim Drop genullt)
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBytes(Vec<u8>);

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pro Nachricht abgeleitetes Material fuer AES-CBC
///
/// Wird nie uebertragen; Sender und Empfaenger leiten es unabhaengig
/// aus dem ephemeren Nachrichten-Schluessel und dem Langzeit-Schluessel ab.
#[derive(Debug, Clone)]
pub struct MessageKeys {
    /// AES-128-Schluessel
    pub aes_key: SecretBytes,
    /// Initialisierungsvektor fuer CBC
    pub iv: [u8; AES_BLOCK_SIZE],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_verraet_keine_bytes() {
        let secret = SecretBytes::new(vec![0x41; 16]);
        let debug = format!("{secret:?}");
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains("16 bytes"));
        assert!(!debug.contains("65"));
    }

    #[test]
    fn from_slice_kopiert() {
        let raw = [1u8, 2, 3];
        let secret = SecretBytes::from_slice(&raw);
        assert_eq!(secret.as_bytes(), &raw);
        assert_eq!(secret.len(), 3);
        assert!(!secret.is_empty());
    }
}
