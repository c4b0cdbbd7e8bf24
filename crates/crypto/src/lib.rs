//! # lncf-crypto
//!
//! Schluessel-Verwaltung und Krypto-Primitiven fuer LNCF.
//!
//! ## Module
//! - `primitives` - CRC32, SHA-1, SHA-256, Base64
//! - `cipher` - AES-CBC ohne implizites Padding
//! - `mac` - HMAC-SHA256 ueber rohe Schluessel
//! - `kdf` - Ableitung von AES-Schluessel und IV pro Nachricht (HKDF-SHA256)
//! - `registry` - `KeyRegistry`: Fingerprint -> Langzeit-Schluessel
//! - `types` - `SecretBytes`, `MessageKeys`

pub mod cipher;
pub mod kdf;
pub mod mac;
pub mod primitives;
pub mod registry;
pub mod types;

// Bequeme Re-Exports
pub use cipher::{aes_cbc_decrypt, aes_cbc_encrypt};
pub use kdf::derive_message_keys;
pub use primitives::{base64_decode, base64_encode, crc32, sha1, sha256};
pub use registry::{fingerprint_of, KeyRegistry};
pub use types::{MessageKeys, SecretBytes};

/// Standard-Schluessellaenge fuer generierte Langzeit-Schluessel (AES-128)
pub const KEY_LENGTH: usize = 16;

/// Laenge des ephemeren Nachrichten-Schluessels im verschluesselten Paket
pub const MSG_KEY_SIZE: usize = 16;

/// AES-Blockgroesse (gleichzeitig IV-Laenge)
pub const AES_BLOCK_SIZE: usize = 16;

/// Laenge des HMAC-SHA256-Tags
pub const HMAC_TAG_SIZE: usize = 32;

/// Laenge des aus der KDF abgeleiteten AES-Schluessels (AES-128)
pub const DERIVED_KEY_SIZE: usize = 16;
