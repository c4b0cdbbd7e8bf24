//! lncf-core – Gemeinsame Typen, Konstanten und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! LNCF-Crates gemeinsam genutzt werden: den zentralen Fehler-Enum,
//! den Schluessel-Fingerprint und die Topic-Validierung.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{LncfError, Result};
pub use types::{topic_pruefen, KeyFingerprint, MAX_TOPIC_LAENGE};
