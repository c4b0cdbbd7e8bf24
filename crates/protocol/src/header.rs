//! Header-Byte eines LNCF-Pakets
//!
//! ```text
//! Bit   7 6 5   4 3 2 1 0
//!       -----   ---------
//!       Version Flags
//! ```
//!
//! Nur Version 0 ist definiert. Von den Flags sind Bit 1 (verschluesselt)
//! und Bit 0 (Discovery) belegt, Bits 2-4 sind reserviert.

use lncf_core::{LncfError, Result};

/// Aktuelle Protokollversion
pub const PROTOKOLL_VERSION: u8 = 0;

/// Bit-Masken fuer die Flags im Header-Byte
pub struct PaketFlags;

impl PaketFlags {
    /// Discovery-Anfrage
    pub const DISCOVERY: u8 = 0x01;
    /// Verschluesselte Nachricht
    pub const ENCRYPTED: u8 = 0x02;
    /// Alle reservierten Bits (2-4)
    pub const RESERVIERT: u8 = 0x1C;
    /// Maske fuer das gesamte Flag-Feld
    pub const MASKE: u8 = 0x1F;
}

/// Art des Pakets, abgeleitet aus den Flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Data,
    Encrypted,
    Discovery,
}

/// Dekodiertes Header-Byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub version: u8,
    pub flags: u8,
}

impl PacketHeader {
    pub fn new(flags: u8) -> Self {
        Self {
            version: PROTOKOLL_VERSION,
            flags: flags & PaketFlags::MASKE,
        }
    }

    pub fn for_kind(kind: PacketKind) -> Self {
        match kind {
            PacketKind::Data => Self::new(0),
            PacketKind::Encrypted => Self::new(PaketFlags::ENCRYPTED),
            PacketKind::Discovery => Self::new(PaketFlags::DISCOVERY),
        }
    }

    pub fn encode(&self) -> u8 {
        (self.version << 5) | (self.flags & PaketFlags::MASKE)
    }

    /// Zerlegt das Header-Byte; fremde Versionen werden abgelehnt
    pub fn decode(byte: u8) -> Result<Self> {
        let version = byte >> 5;
        if version != PROTOKOLL_VERSION {
            return Err(LncfError::ProtokollVersion(version));
        }
        Ok(Self {
            version,
            flags: byte & PaketFlags::MASKE,
        })
    }

    pub fn hat_flag(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// Bestimmt die Paketart
    ///
    /// Reihenfolge: verschluesselt, dann Discovery, dann Daten. Eine
    /// Datennachricht verlangt, dass alle fuenf Flag-Bits null sind;
    /// ein Paket mit nur reservierten Bits hat keine Art (`None`).
    pub fn kind(&self) -> Option<PacketKind> {
        if self.hat_flag(PaketFlags::ENCRYPTED) {
            Some(PacketKind::Encrypted)
        } else if self.hat_flag(PaketFlags::DISCOVERY) {
            Some(PacketKind::Discovery)
        } else if self.flags == 0 {
            Some(PacketKind::Data)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bytes_pro_art() {
        assert_eq!(PacketHeader::for_kind(PacketKind::Data).encode(), 0x00);
        assert_eq!(PacketHeader::for_kind(PacketKind::Discovery).encode(), 0x01);
        assert_eq!(PacketHeader::for_kind(PacketKind::Encrypted).encode(), 0x02);
    }

    #[test]
    fn verschluesselt_hat_vorrang() {
        // Beide Bits gesetzt: verschluesselt gewinnt
        let header = PacketHeader::decode(0x03).unwrap();
        assert_eq!(header.kind(), Some(PacketKind::Encrypted));
    }

    #[test]
    fn nur_reservierte_bits_hat_keine_art() {
        for byte in [0x04u8, 0x08, 0x10, 0x1C] {
            let header = PacketHeader::decode(byte).unwrap();
            assert_eq!(header.kind(), None, "Header {byte:#04x}");
        }
        // Reserviertes Bit neben Discovery stoert die Erkennung nicht
        assert_eq!(
            PacketHeader::decode(0x05).unwrap().kind(),
            Some(PacketKind::Discovery)
        );
    }

    #[test]
    fn fremde_version_wird_abgelehnt() {
        let err = PacketHeader::decode(0b0010_0000).unwrap_err();
        assert!(matches!(err, LncfError::ProtokollVersion(1)));
        assert!(matches!(
            PacketHeader::decode(0xE2).unwrap_err(),
            LncfError::ProtokollVersion(7)
        ));
    }
}
