//! Schluessel-Registry: Fingerprint -> Langzeit-Schluessel
//!
//! Die Registry ist der einzige Ort, an dem Langzeit-Schluessel leben.
//! Nach aussen gehen nur Fingerprints; alle Operationen die Schluesselmaterial
//! brauchen (HMAC, KDF) laufen ueber die Registry.
//!
//! Thread-safe durch DashMap: Lookups im Empfangs-Task laufen parallel zu
//! Registrierungen aus dem Anwendungs-Code.

use std::sync::Arc;

use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;

use lncf_core::{KeyFingerprint, LncfError, Result};

use crate::kdf::derive_message_keys;
use crate::mac;
use crate::primitives::{base64_encode, sha256};
use crate::types::{MessageKeys, SecretBytes};
use crate::{HMAC_TAG_SIZE, KEY_LENGTH};

/// Berechnet den Fingerprint eines Schluessels: `Base64(SHA-256(key))`
pub fn fingerprint_of(key: &[u8]) -> KeyFingerprint {
    KeyFingerprint::new(base64_encode(&sha256(key)))
}

// ---------------------------------------------------------------------------
// KeyRegistry
// ---------------------------------------------------------------------------

/// Menge der registrierten symmetrischen Schluessel, indexiert nach Fingerprint
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: DashMap<KeyFingerprint, Arc<SecretBytes>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registriert einen Schluessel und gibt seinen Fingerprint zurueck
    ///
    /// Gleiche Bytes ergeben denselben Fingerprint; erneutes Registrieren
    /// ueberschreibt denselben Eintrag.
    pub fn register(&self, key: &[u8]) -> KeyFingerprint {
        let fingerprint = fingerprint_of(key);
        self.keys
            .insert(fingerprint.clone(), Arc::new(SecretBytes::from_slice(key)));
        tracing::debug!(fingerprint = %fingerprint, laenge = key.len(), "Schluessel registriert");
        fingerprint
    }

    /// Erzeugt einen Zufallsschluessel (`KEY_LENGTH` Bytes aus dem OS-CSPRNG)
    /// und registriert ihn
    pub fn generate(&self) -> KeyFingerprint {
        let mut key = [0u8; KEY_LENGTH];
        OsRng.fill_bytes(&mut key);
        let fingerprint = self.register(&key);
        key.iter_mut().for_each(|b| *b = 0);
        fingerprint
    }

    /// Entfernt einen Schluessel; gibt `false` zurueck wenn er nicht existierte
    pub fn unregister(&self, fingerprint: &KeyFingerprint) -> bool {
        let entfernt = self.keys.remove(fingerprint).is_some();
        if entfernt {
            tracing::debug!(fingerprint = %fingerprint, "Schluessel entfernt");
        }
        entfernt
    }

    /// Sucht den Schluessel hinter einem Fingerprint
    pub fn lookup(&self, fingerprint: &KeyFingerprint) -> Option<Arc<SecretBytes>> {
        self.keys.get(fingerprint).map(|eintrag| Arc::clone(eintrag.value()))
    }

    pub fn contains(&self, fingerprint: &KeyFingerprint) -> bool {
        self.keys.contains_key(fingerprint)
    }

    /// Alle registrierten Fingerprints, sortiert
    pub fn fingerprints(&self) -> Vec<KeyFingerprint> {
        let mut alle: Vec<KeyFingerprint> =
            self.keys.iter().map(|eintrag| eintrag.key().clone()).collect();
        alle.sort();
        alle
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn schluessel(&self, fingerprint: &KeyFingerprint) -> Result<Arc<SecretBytes>> {
        self.lookup(fingerprint)
            .ok_or_else(|| LncfError::UnknownKey(fingerprint.to_string()))
    }

    /// HMAC-SHA256 mit dem Schluessel hinter `fingerprint`
    pub fn hmac_sha256(
        &self,
        fingerprint: &KeyFingerprint,
        message: &[u8],
    ) -> Result<[u8; HMAC_TAG_SIZE]> {
        let key = self.schluessel(fingerprint)?;
        mac::hmac_sha256(key.as_bytes(), message)
    }

    /// Prueft eine Nachricht deren letzte 32 Bytes der HMAC-Tag sind
    ///
    /// Jeder Fehlerpfad (zu kurz, unbekannter Schluessel, falscher Tag)
    /// ergibt `false`. Der Vergleich laeuft in konstanter Zeit.
    pub fn verify_hmac256(&self, fingerprint: &KeyFingerprint, message_with_tag: &[u8]) -> bool {
        if message_with_tag.len() < HMAC_TAG_SIZE {
            return false;
        }
        let Some(key) = self.lookup(fingerprint) else {
            return false;
        };
        let (message, tag) = message_with_tag.split_at(message_with_tag.len() - HMAC_TAG_SIZE);
        mac::verify_tag(key.as_bytes(), message, tag)
    }

    /// Leitet AES-Schluessel und IV fuer eine Nachricht ab
    pub fn kdf(&self, message_key: &[u8], fingerprint: &KeyFingerprint) -> Result<MessageKeys> {
        let key = self.schluessel(fingerprint)?;
        derive_message_keys(key.as_bytes(), message_key, fingerprint)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
