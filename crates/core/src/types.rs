//! Gemeinsame Typen fuer LNCF
//!
//! Der Schluessel-Fingerprint verwendet das Newtype-Pattern, damit er
//! nicht mit Topics oder anderen Strings verwechselt werden kann.

use serde::{Deserialize, Serialize};

use crate::error::{LncfError, Result};

/// Maximale Topic-Laenge in Bytes (das Laengenfeld im Paket ist 1 Byte)
pub const MAX_TOPIC_LAENGE: usize = 255;

/// Fingerprint eines registrierten Schluessels: `Base64(SHA-256(key))`
///
/// Die einzige Referenz auf einen Schluessel, die die Krypto-Grenze
/// verlaesst. Pakete verweisen nur ueber den Fingerprint auf Schluessel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyFingerprint(String);

impl KeyFingerprint {
    /// Laenge eines Fingerprints in Bytes (Base64 von 32 Bytes mit Padding)
    pub const SIZE: usize = 44;

    /// Uebernimmt einen bereits berechneten Fingerprint-String
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self(fingerprint.into())
    }

    /// Liest einen Fingerprint aus den Rohbytes eines Pakets
    ///
    /// Gibt `None` zurueck wenn die Laenge nicht stimmt oder die Bytes
    /// kein ASCII sind.
    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE || !bytes.is_ascii() {
            return None;
        }
        std::str::from_utf8(bytes).ok().map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for KeyFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Prueft ob ein Topic in das 1-Byte-Laengenfeld passt
pub fn topic_pruefen(topic: &str) -> Result<()> {
    if topic.len() > MAX_TOPIC_LAENGE {
        return Err(LncfError::TopicTooLong {
            laenge: topic.len(),
            max: MAX_TOPIC_LAENGE,
        });
    }
    Ok(())
}
