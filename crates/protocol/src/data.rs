//! Klartext-Datennachricht
//!
//! ```text
//! Offset      Len  Beschreibung
//! ----------  ---  -----------
//!  0           1   Header (0x00)
//!  1           1   Topic-Laenge T
//!  2           T   Topic (UTF-8)
//!  2+T         2   Nutzdaten-Laenge P (big-endian)
//!  4+T         P   Nutzdaten
//!  4+T+P       4   CRC32 (big-endian)
//! ```
//!
//! Der Rumpf ohne Header und CRC (`[T][Topic][P][Nutzdaten]`) ist zugleich
//! der Inhalt des inneren Frames verschluesselter Nachrichten.

use bytes::{BufMut, BytesMut};

use lncf_core::{topic_pruefen, LncfError, Result};

use crate::header::{PacketHeader, PacketKind};
use crate::lesen::Leser;
use crate::packet::{crc_anhaengen, groesse_pruefen};
use crate::CRC_SIZE;

/// Topic + Nutzdaten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl DataMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Kodiert die Nachricht als vollstaendiges Paket inklusive CRC
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_clear(&self.topic, &self.payload)
    }

    /// Parst den Rumpf `[T][Topic][P][Nutzdaten]`
    ///
    /// Ueberzaehlige Bytes nach den Nutzdaten machen den Rumpf ungueltig.
    pub fn decode_body(rumpf: &[u8]) -> Result<Self> {
        let mut leser = Leser::neu(rumpf);

        let topic_laenge = leser.u8("Topic-Laenge")? as usize;
        let topic_bytes = leser.bytes(topic_laenge, "Topic")?;
        let topic = std::str::from_utf8(topic_bytes)
            .map_err(|_| LncfError::malformed("Topic ist kein UTF-8"))?
            .to_string();

        let payload_laenge = leser.u16("Nutzdaten-Laenge")? as usize;
        let payload = leser.bytes(payload_laenge, "Nutzdaten")?.to_vec();
        leser.ende("Datennachricht")?;

        Ok(Self { topic, payload })
    }
}

/// Laenge des Rumpfs ohne Header und CRC
pub fn body_len(topic: &str, payload: &[u8]) -> usize {
    1 + topic.len() + 2 + payload.len()
}

/// Schreibt `[T][Topic][P][Nutzdaten]`
///
/// Der Aufrufer hat Topic- und Gesamtlaenge bereits geprueft.
pub(crate) fn body_schreiben(buf: &mut BytesMut, topic: &str, payload: &[u8]) {
    buf.put_u8(topic.len() as u8);
    buf.put_slice(topic.as_bytes());
    buf.put_u16(payload.len() as u16);
    buf.put_slice(payload);
}

/// Prueft Topic und Nutzdaten auf ihre Laengenfelder
pub(crate) fn body_pruefen(topic: &str, payload: &[u8]) -> Result<()> {
    topic_pruefen(topic)?;
    if payload.len() > u16::MAX as usize {
        return Err(LncfError::PayloadTooLarge {
            laenge: payload.len(),
            max: u16::MAX as usize,
        });
    }
    Ok(())
}

/// Kodiert eine Klartext-Datennachricht ohne Zwischenkopie
///
/// # Fehler
/// - `TopicTooLong` wenn das Topic laenger als 255 Bytes ist
/// - `PayloadTooLarge` wenn das Paket `MAX_LENGTH` ueberschreiten wuerde
pub fn encode_clear(topic: &str, payload: &[u8]) -> Result<Vec<u8>> {
    topic_pruefen(topic)?;
    let gesamt = 1 + body_len(topic, payload) + CRC_SIZE;
    groesse_pruefen(gesamt)?;

    let mut buf = BytesMut::with_capacity(gesamt);
    buf.put_u8(PacketHeader::for_kind(PacketKind::Data).encode());
    body_schreiben(&mut buf, topic, payload);
    crc_anhaengen(&mut buf);
    Ok(buf.to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
