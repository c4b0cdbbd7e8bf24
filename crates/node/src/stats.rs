//! Knoten-Statistik – Zaehler fuer Empfang, Verwerfen und Versand
//!
//! Lock-frei ueber `AtomicU64`; der Empfangs-Task zaehlt, beliebige
//! andere Tasks lesen per `snapshot()`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Laufende Zaehler eines Knotens
#[derive(Debug, Default)]
pub struct NodeStats {
    empfangen: AtomicU64,
    zugestellt: AtomicU64,
    handler_fehler: AtomicU64,
    ohne_handler: AtomicU64,
    verworfen_kurz: AtomicU64,
    verworfen_crc: AtomicU64,
    verworfen_ungueltig: AtomicU64,
    verworfen_auth: AtomicU64,
    discovery: AtomicU64,
    gesendet: AtomicU64,
}

/// Momentaufnahme aller Zaehler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Alle empfangenen Datagramme
    pub empfangen: u64,
    /// An einen Handler uebergebene Nachrichten
    pub zugestellt: u64,
    /// Handler-Aufrufe, die mit einer Panic endeten
    pub handler_fehler: u64,
    /// Gueltige Nachrichten fuer Topics ohne Handler
    pub ohne_handler: u64,
    /// Kuerzer als die Mindestlaenge
    pub verworfen_kurz: u64,
    /// CRC32 stimmte nicht
    pub verworfen_crc: u64,
    /// Strukturell ungueltig (Laengen, Version, Flags, UTF-8)
    pub verworfen_ungueltig: u64,
    /// Unbekannter Schluessel oder falscher HMAC
    pub verworfen_auth: u64,
    /// Erkannte Discovery-Anfragen
    pub discovery: u64,
    /// Erfolgreich gesendete Pakete
    pub gesendet: u64,
}

impl StatsSnapshot {
    /// Summe aller verworfenen Datagramme
    pub fn verworfen(&self) -> u64 {
        self.verworfen_kurz + self.verworfen_crc + self.verworfen_ungueltig + self.verworfen_auth
    }

    /// Gibt eine lesbare Zusammenfassung zurueck
    pub fn zusammenfassung(&self) -> String {
        format!(
            "Empfangen={} Zugestellt={} HandlerFehler={} OhneHandler={} Verworfen={} (kurz={}, crc={}, ungueltig={}, auth={}) Discovery={} Gesendet={}",
            self.empfangen,
            self.zugestellt,
            self.handler_fehler,
            self.ohne_handler,
            self.verworfen(),
            self.verworfen_kurz,
            self.verworfen_crc,
            self.verworfen_ungueltig,
            self.verworfen_auth,
            self.discovery,
            self.gesendet,
        )
    }
}

fn eins(zaehler: &AtomicU64) {
    zaehler.fetch_add(1, Ordering::Relaxed);
}

impl NodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn empfangen(&self) {
        eins(&self.empfangen);
    }

    pub(crate) fn zugestellt(&self) {
        eins(&self.zugestellt);
    }

    pub(crate) fn handler_fehler(&self) {
        eins(&self.handler_fehler);
    }

    pub(crate) fn ohne_handler(&self) {
        eins(&self.ohne_handler);
    }

    pub(crate) fn verworfen_kurz(&self) {
        eins(&self.verworfen_kurz);
    }

    pub(crate) fn verworfen_crc(&self) {
        eins(&self.verworfen_crc);
    }

    pub(crate) fn verworfen_ungueltig(&self) {
        eins(&self.verworfen_ungueltig);
    }

    pub(crate) fn verworfen_auth(&self) {
        eins(&self.verworfen_auth);
    }

    pub(crate) fn discovery(&self) {
        eins(&self.discovery);
    }

    pub(crate) fn gesendet(&self) {
        eins(&self.gesendet);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let lesen = |z: &AtomicU64| z.load(Ordering::Relaxed);
        StatsSnapshot {
            empfangen: lesen(&self.empfangen),
            zugestellt: lesen(&self.zugestellt),
            handler_fehler: lesen(&self.handler_fehler),
            ohne_handler: lesen(&self.ohne_handler),
            verworfen_kurz: lesen(&self.verworfen_kurz),
            verworfen_crc: lesen(&self.verworfen_crc),
            verworfen_ungueltig: lesen(&self.verworfen_ungueltig),
            verworfen_auth: lesen(&self.verworfen_auth),
            discovery: lesen(&self.discovery),
            gesendet: lesen(&self.gesendet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zaehler_starten_bei_null() {
        assert_eq!(NodeStats::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn verworfen_summiert_alle_gruende() {
        let stats = NodeStats::new();
        stats.verworfen_kurz();
        stats.verworfen_crc();
        stats.verworfen_crc();
        stats.verworfen_ungueltig();
        stats.verworfen_auth();
        stats.zugestellt();

        let snap = stats.snapshot();
        assert_eq!(snap.verworfen(), 5);
        assert_eq!(snap.verworfen_crc, 2);
        assert_eq!(snap.zugestellt, 1);
    }

    #[test]
    fn zusammenfassung_enthaelt_zaehler() {
        let stats = NodeStats::new();
        stats.empfangen();
        stats.gesendet();
        stats.handler_fehler();
        let text = stats.snapshot().zusammenfassung();
        assert!(text.contains("Empfangen=1"));
        assert!(text.contains("HandlerFehler=1"));
        assert!(text.contains("Gesendet=1"));
    }
}
