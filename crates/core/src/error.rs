//! Fehlertypen fuer LNCF
//!
//! Zentraler Fehler-Enum fuer alle Crates. Es gibt zwei Klassen:
//!
//! - **Nutzungsfehler** (`UnknownKey`, `InvalidLength`, `TopicTooLong`,
//!   `PayloadTooLarge`, `TopicAlreadyHandled`) werden synchron an den
//!   Aufrufer zurueckgegeben.
//! - **Eingangsfehler** (`Malformed`, `CrcMismatch`, `Authentifizierung`, ...)
//!   entstehen nur beim Parsen empfangener Datagramme. Der Dispatcher
//!   verwirft das Paket und laeuft weiter; sie verlassen nie die Empfangs-Loop.
//!
//! Fehlermeldungen enthalten niemals Schluesselmaterial, hoechstens Fingerprints.

use thiserror::Error;

/// Globaler Result-Alias fuer LNCF
pub type Result<T> = std::result::Result<T, LncfError>;

/// Alle moeglichen Fehler im LNCF-System
#[derive(Debug, Error)]
pub enum LncfError {
    // --- Schluessel & Krypto ---
    #[error("Unbekannter Schluessel: {0}")]
    UnknownKey(String),

    #[error("Ungueltige Laenge: {laenge} Bytes ist kein Vielfaches von {blockgroesse}")]
    InvalidLength { laenge: usize, blockgroesse: usize },

    #[error("Ungueltige Schluessel-Laenge: {erhalten} Bytes (erlaubt: 16, 24 oder 32)")]
    UngueltigeSchluesselLaenge { erhalten: usize },

    #[error("Key Derivation fehlgeschlagen: {0}")]
    KeyDerivation(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),

    // --- Ausgehende Pakete ---
    #[error("Topic zu lang: {laenge} Bytes (Maximum {max})")]
    TopicTooLong { laenge: usize, max: usize },

    #[error("Nutzdaten zu gross: Paket haette {laenge} Bytes (Maximum {max})")]
    PayloadTooLarge { laenge: usize, max: usize },

    // --- Handler ---
    #[error("Topic wird bereits behandelt: '{0}'")]
    TopicAlreadyHandled(String),

    // --- Eingehende Pakete ---
    #[error("Ungueltiges Paket: {0}")]
    Malformed(String),

    #[error("CRC32 stimmt nicht: berechnet {berechnet:#010x}, empfangen {empfangen:#010x}")]
    CrcMismatch { berechnet: u32, empfangen: u32 },

    #[error("Protokollversion nicht unterstuetzt: {0}")]
    ProtokollVersion(u8),

    #[error("Authentifizierung fehlgeschlagen")]
    Authentifizierung,

    // --- Transport ---
    #[error("Ungueltige Adresse: {0}")]
    UngueltigeAdresse(String),

    #[error("Ungueltiger Zustand: {operation} ist im Zustand {zustand} nicht erlaubt")]
    UngueltigerZustand {
        operation: &'static str,
        zustand: String,
    },

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

impl LncfError {
    /// Erstellt einen `Malformed`-Fehler aus einer beliebigen Nachricht
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler eine Fehlbenutzung durch den Aufrufer ist
    pub fn ist_nutzungsfehler(&self) -> bool {
        matches!(
            self,
            Self::UnknownKey(_)
                | Self::InvalidLength { .. }
                | Self::UngueltigeSchluesselLaenge { .. }
                | Self::TopicTooLong { .. }
                | Self::PayloadTooLarge { .. }
                | Self::TopicAlreadyHandled(_)
        )
    }

    /// Gibt true zurueck wenn der Fehler aus nicht vertrauenswuerdigen Netzwerkdaten stammt
    ///
    /// Solche Fehler werden im Empfangspfad zu einem stillen Verwerfen.
    pub fn ist_eingangsfehler(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_)
                | Self::CrcMismatch { .. }
                | Self::ProtokollVersion(_)
                | Self::Authentifizierung
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = LncfError::TopicAlreadyHandled("temp".into());
        assert_eq!(e.to_string(), "Topic wird bereits behandelt: 'temp'");
    }

    #[test]
    fn crc_fehler_hexadezimal() {
        let e = LncfError::CrcMismatch {
            berechnet: 0xDEAD_BEEF,
            empfangen: 0x1,
        };
        assert!(e.to_string().contains("0xdeadbeef"));
        assert!(e.to_string().contains("0x00000001"));
    }

    #[test]
    fn klassifikation() {
        assert!(LncfError::UnknownKey("fp".into()).ist_nutzungsfehler());
        assert!(LncfError::TopicTooLong { laenge: 300, max: 255 }.ist_nutzungsfehler());
        assert!(!LncfError::Authentifizierung.ist_nutzungsfehler());

        assert!(LncfError::Authentifizierung.ist_eingangsfehler());
        assert!(LncfError::malformed("kaputt").ist_eingangsfehler());
        assert!(!LncfError::TopicAlreadyHandled("x".into()).ist_eingangsfehler());
    }

    #[test]
    fn io_fehler_konvertierung() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "belegt");
        let e: LncfError = io.into();
        assert!(matches!(e, LncfError::Io(_)));
    }
}
