//! Einstiegspunkt fuer empfangene Datagramme
//!
//! Reihenfolge der Pruefungen:
//! 1. Mindestlaenge (`MIN_PACKET_LENGTH`) und Maximallaenge (`MAX_LENGTH`)
//! 2. CRC32 ueber alles ausser den letzten 4 Bytes
//! 3. Version im Header-Byte
//! 4. Paketart aus den Flags, dann strukturiertes Parsen
//!
//! Verschluesselte Nachrichten werden hier nur zerlegt, nicht geoeffnet;
//! dafuer braucht es die `KeyRegistry` (siehe [`EncryptedMessage::open`]).

use bytes::{BufMut, BytesMut};

use lncf_core::{LncfError, Result};
use lncf_crypto::crc32;

use crate::data::DataMessage;
use crate::discovery::DiscoveryMessage;
use crate::encrypted::EncryptedMessage;
use crate::header::{PacketHeader, PacketKind};
use crate::{CRC_SIZE, MAX_LENGTH, MIN_PACKET_LENGTH};

/// Ein vollstaendig geparstes Paket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Data(DataMessage),
    Encrypted(EncryptedMessage),
    Discovery(DiscoveryMessage),
}

impl Packet {
    /// Parst ein empfangenes Datagramm
    ///
    /// Jeder Fehler bedeutet fuer den Empfaenger: Paket verwerfen.
    pub fn decode(datagramm: &[u8]) -> Result<Self> {
        if datagramm.len() < MIN_PACKET_LENGTH {
            return Err(LncfError::malformed(format!(
                "Datagramm zu kurz: {} Bytes (Minimum {MIN_PACKET_LENGTH})",
                datagramm.len()
            )));
        }
        if datagramm.len() > MAX_LENGTH {
            return Err(LncfError::malformed(format!(
                "Datagramm zu lang: {} Bytes (Maximum {MAX_LENGTH})",
                datagramm.len()
            )));
        }

        let rumpf = crc_abtrennen(datagramm)?;
        let header = PacketHeader::decode(rumpf[0])?;
        let inhalt = &rumpf[1..];

        match header.kind() {
            Some(PacketKind::Encrypted) => EncryptedMessage::decode_body(inhalt).map(Self::Encrypted),
            Some(PacketKind::Discovery) => DiscoveryMessage::decode_body(inhalt).map(Self::Discovery),
            Some(PacketKind::Data) => DataMessage::decode_body(inhalt).map(Self::Data),
            None => Err(LncfError::malformed(format!(
                "nur reservierte Flags gesetzt: {:#04x}",
                header.flags
            ))),
        }
    }

    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Data(_) => PacketKind::Data,
            Self::Encrypted(_) => PacketKind::Encrypted,
            Self::Discovery(_) => PacketKind::Discovery,
        }
    }
}

/// Haengt die CRC32 ueber den bisherigen Pufferinhalt an (big-endian)
pub(crate) fn crc_anhaengen(buf: &mut BytesMut) {
    let crc = crc32(&buf[..]);
    buf.put_u32(crc);
}

/// Prueft die abschliessende CRC32 und gibt die Bytes davor zurueck
///
/// Gibt fuer weniger als `CRC_SIZE + 1` Bytes `Malformed` zurueck.
pub fn crc_abtrennen(datagramm: &[u8]) -> Result<&[u8]> {
    if datagramm.len() <= CRC_SIZE {
        return Err(LncfError::malformed("kein Platz fuer Header und CRC"));
    }
    let (rumpf, crc_bytes) = datagramm.split_at(datagramm.len() - CRC_SIZE);
    let empfangen = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let berechnet = crc32(rumpf);
    if berechnet != empfangen {
        return Err(LncfError::CrcMismatch {
            berechnet,
            empfangen,
        });
    }
    Ok(rumpf)
}

/// Prueft die Gesamtgroesse eines zu sendenden Pakets
pub(crate) fn groesse_pruefen(laenge: usize) -> Result<()> {
    if laenge > MAX_LENGTH {
        return Err(LncfError::PayloadTooLarge {
            laenge,
            max: MAX_LENGTH,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
