//! Discovery-Anfrage (Stub)
//!
//! ```text
//! [0x01][Anfrage-Laenge:2 BE][Anfrage][CRC32:4]
//! ```
//!
//! Es gibt keine Antworten und keine Dienst-Registry. Empfaenger erkennen
//! und zaehlen die Anfrage, mehr nicht.

use bytes::{BufMut, BytesMut};

use lncf_core::Result;

use crate::header::{PacketHeader, PacketKind};
use crate::lesen::Leser;
use crate::packet::{crc_anhaengen, groesse_pruefen};
use crate::CRC_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryMessage {
    pub request: Vec<u8>,
}

impl DiscoveryMessage {
    pub fn new(request: impl Into<Vec<u8>>) -> Self {
        Self {
            request: request.into(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let gesamt = 1 + 2 + self.request.len() + CRC_SIZE;
        groesse_pruefen(gesamt)?;

        let mut buf = BytesMut::with_capacity(gesamt);
        buf.put_u8(PacketHeader::for_kind(PacketKind::Discovery).encode());
        buf.put_u16(self.request.len() as u16);
        buf.put_slice(&self.request);
        crc_anhaengen(&mut buf);
        Ok(buf.to_vec())
    }

    pub fn decode_body(rumpf: &[u8]) -> Result<Self> {
        let mut leser = Leser::neu(rumpf);
        let laenge = leser.u16("Anfrage-Laenge")? as usize;
        let request = leser.bytes(laenge, "Anfrage")?.to_vec();
        leser.ende("Discovery-Anfrage")?;
        Ok(Self { request })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::crc_abtrennen;
    use lncf_core::LncfError;

    #[test]
    fn byte_layout() {
        let paket = DiscoveryMessage::new(b"svc".to_vec()).encode().unwrap();
        assert_eq!(paket[0], 0x01);
        assert_eq!(&paket[1..3], &[0x00u8, 0x03]);
        assert_eq!(&paket[3..6], b"svc");
        assert_eq!(paket.len(), 10);

        let rumpf = crc_abtrennen(&paket).unwrap();
        assert_eq!(DiscoveryMessage::decode_body(&rumpf[1..]).unwrap().request, b"svc");
    }

    #[test]
    fn zu_grosse_anfrage() {
        let err = DiscoveryMessage::new(vec![0u8; 1018]).encode().unwrap_err();
        assert!(matches!(err, LncfError::PayloadTooLarge { laenge: 1025, .. }));
    }

    #[test]
    fn inkonsistente_laenge() {
        assert!(DiscoveryMessage::decode_body(&[0x00, 0x05, 1, 2]).is_err());
        assert!(DiscoveryMessage::decode_body(&[0x00, 0x01, 1, 2]).is_err());
    }
}
