//! Bounds-gepruefter Leser fuer nicht vertrauenswuerdige Paketbytes
//!
//! Jede Leseoperation prueft die Restlaenge und gibt `Malformed` zurueck
//! statt zu paniken.

use lncf_core::{LncfError, Result};

pub(crate) struct Leser<'a> {
    rest: &'a [u8],
}

impl<'a> Leser<'a> {
    pub(crate) fn neu(bytes: &'a [u8]) -> Self {
        Self { rest: bytes }
    }

    pub(crate) fn bytes(&mut self, n: usize, feld: &str) -> Result<&'a [u8]> {
        if self.rest.len() < n {
            return Err(LncfError::malformed(format!(
                "{feld}: {n} Bytes erwartet, nur {} vorhanden",
                self.rest.len()
            )));
        }
        let (kopf, rest) = self.rest.split_at(n);
        self.rest = rest;
        Ok(kopf)
    }

    pub(crate) fn u8(&mut self, feld: &str) -> Result<u8> {
        Ok(self.bytes(1, feld)?[0])
    }

    pub(crate) fn u16(&mut self, feld: &str) -> Result<u16> {
        let b = self.bytes(2, feld)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Stellt sicher, dass alle Bytes verbraucht wurden
    pub(crate) fn ende(&self, kontext: &str) -> Result<()> {
        if !self.rest.is_empty() {
            return Err(LncfError::malformed(format!(
                "{kontext}: {} ueberzaehlige Bytes",
                self.rest.len()
            )));
        }
        Ok(())
    }
}
