//! lncf-protocol – Binaeres Paketformat
//!
//! Dieses Crate kodiert und dekodiert alle Pakete, die zwischen LNCF-Knoten
//! ueber UDP-Multicast ausgetauscht werden. Es macht selbst kein I/O.
//!
//! ## Gemeinsamer Rahmen
//!
//! ```text
//! [Header:1][... typabhaengiger Inhalt ...][CRC32:4 BE]
//! ```
//!
//! Der CRC laeuft ueber alle vorangehenden Bytes. Alle Ganzzahlen sind
//! big-endian.

pub mod data;
pub mod discovery;
pub mod encrypted;
pub mod header;
pub mod inner;
pub mod packet;

mod lesen;

pub use data::DataMessage;
pub use discovery::DiscoveryMessage;
pub use encrypted::EncryptedMessage;
pub use header::{PacketHeader, PacketKind, PaketFlags};
pub use packet::Packet;

/// Maximale Groesse eines Pakets in Bytes (gleichzeitig Empfangspuffer)
pub const MAX_LENGTH: usize = 1024;

/// Kleinste Datagramm-Groesse, die ueberhaupt geparst wird
pub const MIN_PACKET_LENGTH: usize = 9;

/// Groesse der abschliessenden CRC32-Pruefsumme
pub const CRC_SIZE: usize = 4;

/// Standard-UDP-Port
pub const DEFAULT_PORT: u16 = 6666;
