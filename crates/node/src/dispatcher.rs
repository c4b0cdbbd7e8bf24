//! Dispatcher – Empfangs-Loop und Verteilung eingehender Datagramme
//!
//! ## Ablauf pro Datagramm
//!
//! ```text
//! UDP Socket (recv_from)
//!     |
//!     v
//! Mindestlaenge?            <- sonst verwerfen
//!     |
//!     v
//! Packet::decode()          <- CRC, Version, Flags, Struktur
//!     |
//!     +-- Daten ----------> HandlerTable::get(topic) -> Handler::handle()
//!     +-- Verschluesselt -> EncryptedMessage::open() -> wie Daten
//!     +-- Discovery ------> zaehlen, loggen, verwerfen
//! ```
//!
//! Kein Eingangsfehler verlaesst die Loop. Nach jedem Datagramm wird der
//! Empfang sofort neu aufgesetzt; nur das Shutdown-Signal beendet sie.

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::oneshot;

use lncf_core::LncfError;
use lncf_crypto::KeyRegistry;
use lncf_protocol::{DataMessage, Packet, MAX_LENGTH, MIN_PACKET_LENGTH};

use crate::handler::HandlerTable;
use crate::stats::NodeStats;

/// Ergebnis der Verarbeitung eines Datagramms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zustellung {
    /// Ein Handler wurde aufgerufen
    Zugestellt,
    /// Der Handler ist abgestuerzt
    HandlerFehler,
    /// Gueltige Nachricht, aber kein Handler fuer das Topic
    OhneHandler,
    /// Discovery-Anfrage erkannt
    Discovery,
    /// Datagramm verworfen
    Verworfen,
}

/// Verteilt empfangene Datagramme an Handler
#[derive(Debug, Clone)]
pub struct Dispatcher {
    handlers: Arc<HandlerTable>,
    registry: Arc<KeyRegistry>,
    stats: Arc<NodeStats>,
}

impl Dispatcher {
    pub fn new(
        handlers: Arc<HandlerTable>,
        registry: Arc<KeyRegistry>,
        stats: Arc<NodeStats>,
    ) -> Self {
        Self {
            handlers,
            registry,
            stats,
        }
    }

    /// Empfaengt bis `shutdown_rx` ausloest oder der Sender gedroppt wird
    pub(crate) async fn empfangs_loop(
        self,
        socket: Arc<UdpSocket>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        // Ein Byte mehr als erlaubt: laengere Datagramme kommen gekuerzt,
        // aber ueberlang an und scheitern an der Laengenpruefung
        let mut buf = vec![0u8; MAX_LENGTH + 1];

        tracing::info!("Empfangs-Loop gestartet");

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    tracing::debug!("Shutdown-Signal empfangen");
                    break;
                }

                ergebnis = socket.recv_from(&mut buf) => {
                    match ergebnis {
                        Ok((laenge, absender)) => {
                            self.datagramm_verarbeiten(&buf[..laenge], absender);
                        }
                        Err(e) => {
                            tracing::warn!(fehler = %e, "UDP-Empfangsfehler");
                        }
                    }
                }
            }
        }

        tracing::info!("Empfangs-Loop beendet");
    }

    /// Verarbeitet ein einzelnes Datagramm
    ///
    /// Faengt jeden Eingangsfehler ab; der Aufrufer sieht nur das Ergebnis.
    pub fn datagramm_verarbeiten(&self, daten: &[u8], absender: SocketAddr) -> Zustellung {
        self.stats.empfangen();

        if daten.len() < MIN_PACKET_LENGTH {
            self.stats.verworfen_kurz();
            tracing::trace!(absender = %absender, bytes = daten.len(), "Datagramm zu kurz");
            return Zustellung::Verworfen;
        }

        let paket = match Packet::decode(daten) {
            Ok(p) => p,
            Err(e) => {
                match e {
                    LncfError::CrcMismatch { .. } => self.stats.verworfen_crc(),
                    _ => self.stats.verworfen_ungueltig(),
                }
                tracing::debug!(fehler = %e, absender = %absender, "Paket verworfen");
                return Zustellung::Verworfen;
            }
        };

        match paket {
            Packet::Data(nachricht) => self.zustellen(&nachricht, absender),
            Packet::Encrypted(verschluesselt) => match verschluesselt.open(&self.registry) {
                Ok(nachricht) => self.zustellen(&nachricht, absender),
                Err(e) => {
                    match e {
                        LncfError::UnknownKey(_) | LncfError::Authentifizierung => {
                            self.stats.verworfen_auth()
                        }
                        _ => self.stats.verworfen_ungueltig(),
                    }
                    tracing::debug!(
                        fehler = %e,
                        fingerprint = %verschluesselt.fingerprint,
                        absender = %absender,
                        "Verschluesselte Nachricht verworfen"
                    );
                    Zustellung::Verworfen
                }
            },
            Packet::Discovery(anfrage) => {
                self.stats.discovery();
                tracing::debug!(
                    absender = %absender,
                    bytes = anfrage.request.len(),
                    "Discovery-Anfrage empfangen"
                );
                Zustellung::Discovery
            }
        }
    }

    fn zustellen(&self, nachricht: &DataMessage, absender: SocketAddr) -> Zustellung {
        let Some(handler) = self.handlers.get(&nachricht.topic) else {
            self.stats.ohne_handler();
            tracing::trace!(topic = %nachricht.topic, absender = %absender, "Kein Handler fuer Topic");
            return Zustellung::OhneHandler;
        };

        let ergebnis = catch_unwind(AssertUnwindSafe(|| {
            handler.handle(&nachricht.topic, &nachricht.payload)
        }));
        if ergebnis.is_err() {
            self.stats.handler_fehler();
            tracing::warn!(topic = %nachricht.topic, absender = %absender, "Handler ist abgestuerzt");
            return Zustellung::HandlerFehler;
        }

        self.stats.zugestellt();
        tracing::trace!(
            topic = %nachricht.topic,
            bytes = nachricht.payload.len(),
            absender = %absender,
            "Nachricht zugestellt"
        );
        Zustellung::Zugestellt
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lncf_protocol::data::encode_clear;
    use lncf_protocol::{DiscoveryMessage, EncryptedMessage};
    use parking_lot::Mutex;
    use std::net::{IpAddr, Ipv4Addr};

    type Empfangen = Arc<Mutex<Vec<(String, Vec<u8>)>>>;

    fn absender() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 40000)
    }

    fn aufbau(topics: &[&str]) -> (Dispatcher, Empfangen, Arc<KeyRegistry>) {
        let handlers = Arc::new(HandlerTable::new());
        let registry = Arc::new(KeyRegistry::new());
        let empfangen: Empfangen = Arc::new(Mutex::new(Vec::new()));

        for topic in topics {
            let ablage = Arc::clone(&empfangen);
            handlers
                .registrieren(
                    topic,
                    Arc::new(move |t: &str, p: &[u8]| ablage.lock().push((t.to_string(), p.to_vec()))),
                )
                .unwrap();
        }

        let dispatcher = Dispatcher::new(handlers, Arc::clone(&registry), Arc::new(NodeStats::new()));
        (dispatcher, empfangen, registry)
    }

    #[test]
    fn klartext_an_richtigen_handler() {
        let (dispatcher, empfangen, _) = aufbau(&["temp", "druck"]);
        let paket = encode_clear("temp", b"23.5").unwrap();

        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::Zugestellt);

        let alle = empfangen.lock();
        assert_eq!(alle.len(), 1);
        assert_eq!(alle[0], ("temp".to_string(), b"23.5".to_vec()));
    }

    #[test]
    fn fuenf_bytes_werden_still_verworfen() {
        let (dispatcher, empfangen, _) = aufbau(&["temp"]);
        let ergebnis = dispatcher.datagramm_verarbeiten(&[0, 1, 2, 3, 4], absender());
        assert_eq!(ergebnis, Zustellung::Verworfen);
        assert!(empfangen.lock().is_empty());
        assert_eq!(dispatcher.stats.snapshot().verworfen_kurz, 1);
    }

    #[test]
    fn gekipptes_crc_bit_wird_verworfen() {
        let (dispatcher, empfangen, _) = aufbau(&["temp"]);
        let mut paket = encode_clear("temp", b"23.5").unwrap();
        let letztes = paket.len() - 1;
        paket[letztes] ^= 0x10;

        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::Verworfen);
        assert!(empfangen.lock().is_empty());
        assert_eq!(dispatcher.stats.snapshot().verworfen_crc, 1);
    }

    #[test]
    fn topic_ohne_handler() {
        let (dispatcher, empfangen, _) = aufbau(&["temp"]);
        let paket = encode_clear("feuchte", b"40").unwrap();
        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::OhneHandler);
        assert!(empfangen.lock().is_empty());
    }

    #[test]
    fn verschluesselt_an_handler() {
        let (dispatcher, empfangen, registry) = aufbau(&["temp"]);
        let fp = registry.register(&[0x42; 16]);
        let paket = EncryptedMessage::seal(&registry, &fp, "temp", b"23.5").unwrap();

        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::Zugestellt);
        assert_eq!(empfangen.lock()[0], ("temp".to_string(), b"23.5".to_vec()));
    }

    #[test]
    fn verschluesselt_mit_unbekanntem_schluessel() {
        let (dispatcher, empfangen, _) = aufbau(&["temp"]);
        let fremd = KeyRegistry::new();
        let fp = fremd.register(&[0x42; 16]);
        let paket = EncryptedMessage::seal(&fremd, &fp, "temp", b"23.5").unwrap();

        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::Verworfen);
        assert!(empfangen.lock().is_empty());
        assert_eq!(dispatcher.stats.snapshot().verworfen_auth, 1);
    }

    #[test]
    fn discovery_wird_gezaehlt() {
        let (dispatcher, empfangen, _) = aufbau(&["temp"]);
        let paket = DiscoveryMessage::new(b"hallo".to_vec()).encode().unwrap();
        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::Discovery);
        assert!(empfangen.lock().is_empty());
        assert_eq!(dispatcher.stats.snapshot().discovery, 1);
    }

    #[test]
    fn abstuerzender_handler_haelt_dispatcher_nicht_auf() {
        let handlers = Arc::new(HandlerTable::new());
        handlers
            .registrieren("boom", Arc::new(|_: &str, _: &[u8]| panic!("Handler-Fehler")))
            .unwrap();
        let dispatcher = Dispatcher::new(handlers, Arc::new(KeyRegistry::new()), Arc::new(NodeStats::new()));

        let paket = encode_clear("boom", b"x").unwrap();
        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::HandlerFehler);
        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::HandlerFehler);

        let snap = dispatcher.stats.snapshot();
        assert_eq!(snap.handler_fehler, 2);
        assert_eq!(snap.zugestellt, 0);
    }

    #[test]
    fn ueberlanges_datagramm_wird_verworfen() {
        let (dispatcher, empfangen, _) = aufbau(&["t"]);
        let mut paket = encode_clear("t", &[7u8; 1015]).unwrap();
        assert_eq!(paket.len(), MAX_LENGTH);
        paket.push(0xEE);

        assert_eq!(dispatcher.datagramm_verarbeiten(&paket, absender()), Zustellung::Verworfen);
        assert!(empfangen.lock().is_empty());
        assert_eq!(dispatcher.stats.snapshot().verworfen_ungueltig, 1);
    }

    #[test]
    fn zufallsdaten_paniken_nie() {
        let (dispatcher, _, _) = aufbau(&["temp"]);
        let mut zustand = 0x1234_5678u32;
        for laenge in 0..200usize {
            let daten: Vec<u8> = (0..laenge)
                .map(|_| {
                    zustand ^= zustand << 13;
                    zustand ^= zustand >> 17;
                    zustand ^= zustand << 5;
                    zustand as u8
                })
                .collect();
            dispatcher.datagramm_verarbeiten(&daten, absender());
        }
        assert_eq!(dispatcher.stats.snapshot().empfangen, 200);
    }
}
