//! Inneres Frame verschluesselter Nachrichten
//!
//! ```text
//! [Laenge L:2 BE][Null-Padding][innerer Inhalt: L Bytes]
//! ```
//!
//! Der Inhalt steht rechtsbuendig, das Frame ist ein Vielfaches von 16 Bytes
//! (mindestens 16). Beim Auspacken wird die angegebene Laenge gegen den
//! Klartext geprueft und zum Abschneiden verwendet.

use bytes::{BufMut, BytesMut};

use lncf_core::{LncfError, Result};
use lncf_crypto::AES_BLOCK_SIZE;

/// Groesse des Laengenpraefix
pub const LAENGEN_PRAEFIX: usize = 2;

/// Frame-Groesse fuer einen Inhalt von `inhalt_laenge` Bytes
pub fn frame_len(inhalt_laenge: usize) -> usize {
    let roh = LAENGEN_PRAEFIX + inhalt_laenge;
    roh.div_ceil(AES_BLOCK_SIZE).max(1) * AES_BLOCK_SIZE
}

/// Packt einen Inhalt in ein blockbuendiges Frame
pub fn pack(inhalt: &[u8]) -> Result<Vec<u8>> {
    if inhalt.len() > u16::MAX as usize {
        return Err(LncfError::PayloadTooLarge {
            laenge: inhalt.len(),
            max: u16::MAX as usize,
        });
    }
    let gesamt = frame_len(inhalt.len());
    let mut buf = BytesMut::with_capacity(gesamt);
    buf.put_u16(inhalt.len() as u16);
    buf.put_bytes(0, gesamt - LAENGEN_PRAEFIX - inhalt.len());
    buf.put_slice(inhalt);
    Ok(buf.to_vec())
}

/// Holt den Inhalt aus einem entschluesselten Frame
pub fn unpack(klartext: &[u8]) -> Result<&[u8]> {
    if klartext.len() < LAENGEN_PRAEFIX {
        return Err(LncfError::malformed("inneres Frame ohne Laengenpraefix"));
    }
    let laenge = u16::from_be_bytes([klartext[0], klartext[1]]) as usize;
    let verfuegbar = klartext.len() - LAENGEN_PRAEFIX;
    if laenge > verfuegbar {
        return Err(LncfError::malformed(format!(
            "inneres Frame: Laenge {laenge} groesser als verfuegbare {verfuegbar} Bytes"
        )));
    }
    Ok(&klartext[klartext.len() - laenge..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_groessen() {
        assert_eq!(frame_len(0), 16);
        assert_eq!(frame_len(14), 16);
        assert_eq!(frame_len(15), 32);
        assert_eq!(frame_len(30), 32);
        assert_eq!(frame_len(31), 48);
    }

    #[test]
    fn inhalt_steht_rechtsbuendig() {
        let frame = pack(b"abc").unwrap();
        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[..2], &[0x00u8, 0x03]);
        assert!(frame[2..13].iter().all(|&b| b == 0));
        assert_eq!(&frame[13..], b"abc");
        assert_eq!(unpack(&frame).unwrap(), b"abc");
    }

    #[test]
    fn leerer_inhalt() {
        let frame = pack(b"").unwrap();
        assert_eq!(frame.len(), 16);
        assert!(unpack(&frame).unwrap().is_empty());
    }

    #[test]
    fn laenge_groesser_als_klartext_wird_abgelehnt() {
        let mut frame = vec![0u8; 16];
        frame[0] = 0x00;
        frame[1] = 15;
        assert!(unpack(&frame).is_err());
        frame[1] = 14;
        assert_eq!(unpack(&frame).unwrap().len(), 14);
    }

    #[test]
    fn zu_kurzer_klartext() {
        assert!(unpack(&[0x00]).is_err());
        assert!(unpack(&[]).is_err());
    }
}
