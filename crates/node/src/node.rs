//! LNCF-Knoten – Zustandsmaschine und oeffentliche API
//!
//! ```text
//! Idle --init()--> Bound --listen_and_serve()--> Listening --stop()--> Stopped
//! ```
//!
//! Handler und Schluessel koennen in jedem Zustand registriert werden.
//! Senden ist nur im Zustand `Listening` moeglich; Eingaben werden aber
//! immer zuerst validiert, damit Fehlbenutzung unabhaengig vom Zustand
//! auffaellt.

use std::net::SocketAddr;
use std::sync::Arc;

use socket2::Socket;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use lncf_core::{topic_pruefen, KeyFingerprint, LncfError, Result};
use lncf_crypto::KeyRegistry;
use lncf_protocol::data::encode_clear;
use lncf_protocol::{DiscoveryMessage, EncryptedMessage};

use crate::dispatcher::Dispatcher;
use crate::handler::{Handler, HandlerTable};
use crate::socket::{binden_und_beitreten, socket_erstellen, Endpunkte};
use crate::stats::{NodeStats, StatsSnapshot};

/// Lebenszyklus eines Knotens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeZustand {
    Idle,
    Bound,
    Listening,
    Stopped,
}

impl std::fmt::Display for NodeZustand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Bound => "Bound",
            Self::Listening => "Listening",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Laufender Empfang: Socket, Ziel und Handle auf den Empfangs-Task
struct Empfang {
    socket: Arc<UdpSocket>,
    ziel: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Ein Teilnehmer im LNCF-Netz
pub struct LncfNode {
    zustand: NodeZustand,
    registry: Arc<KeyRegistry>,
    handlers: Arc<HandlerTable>,
    stats: Arc<NodeStats>,
    endpunkte: Option<Endpunkte>,
    roh_socket: Option<Socket>,
    empfang: Option<Empfang>,
}

impl std::fmt::Debug for LncfNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LncfNode")
            .field("zustand", &self.zustand)
            .field("endpunkte", &self.endpunkte)
            .field("topics", &self.handlers.topics())
            .field("schluessel", &self.registry.len())
            .finish()
    }
}

impl LncfNode {
    /// Erstellt einen Knoten im Zustand `Idle`
    ///
    /// Die Registry wird geteilt; mehrere Knoten koennen dieselben
    /// Schluessel verwenden.
    pub fn new(registry: Arc<KeyRegistry>) -> Self {
        Self {
            zustand: NodeZustand::Idle,
            registry,
            handlers: Arc::new(HandlerTable::new()),
            stats: Arc::new(NodeStats::new()),
            endpunkte: None,
            roh_socket: None,
            empfang: None,
        }
    }

    pub fn zustand(&self) -> NodeZustand {
        self.zustand
    }

    fn zustand_pruefen(&self, operation: &'static str, erwartet: NodeZustand) -> Result<()> {
        if self.zustand != erwartet {
            return Err(LncfError::UngueltigerZustand {
                operation,
                zustand: self.zustand.to_string(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lebenszyklus
    // -----------------------------------------------------------------------

    /// Validiert die Adressen und erstellt den Socket (`Idle -> Bound`)
    pub fn init(&mut self, listen: &str, gruppe: &str, port: u16) -> Result<()> {
        self.zustand_pruefen("init", NodeZustand::Idle)?;

        let endpunkte = Endpunkte::parsen(listen, gruppe, port)?;
        let socket = socket_erstellen(&endpunkte)?;

        tracing::debug!(
            listen = %endpunkte.listen,
            gruppe = %endpunkte.gruppe,
            port = endpunkte.port,
            "Knoten initialisiert"
        );

        self.endpunkte = Some(endpunkte);
        self.roh_socket = Some(socket);
        self.zustand = NodeZustand::Bound;
        Ok(())
    }

    /// Bindet, tritt der Gruppe bei und startet den Empfangs-Task
    /// (`Bound -> Listening`)
    ///
    /// Kehrt sofort zurueck; empfangen wird im Hintergrund bis `stop()`.
    /// Schlagen Binden oder Gruppenbeitritt fehl, faellt der Knoten auf
    /// `Idle` zurueck.
    pub async fn listen_and_serve(&mut self) -> Result<()> {
        self.zustand_pruefen("listen_and_serve", NodeZustand::Bound)?;

        let (Some(endpunkte), Some(roh)) = (self.endpunkte, self.roh_socket.take()) else {
            return Err(LncfError::UngueltigerZustand {
                operation: "listen_and_serve",
                zustand: "Bound ohne Socket".to_string(),
            });
        };

        let gebunden = binden_und_beitreten(roh, &endpunkte)
            .and_then(|socket| Ok((socket.local_addr()?, socket)));
        let (lokal, socket) = match gebunden {
            Ok((lokal, socket)) => (lokal, Arc::new(socket)),
            Err(e) => {
                // Der Socket ist verbraucht; ein neuer Versuch beginnt bei init()
                self.endpunkte = None;
                self.zustand = NodeZustand::Idle;
                tracing::warn!(
                    fehler = %e,
                    listen = %endpunkte.listen,
                    gruppe = %endpunkte.gruppe,
                    "Binden fehlgeschlagen, Knoten zurueck auf Idle"
                );
                return Err(e);
            }
        };
        // Port 0 bedeutet: vom OS gewaehlt, gesendet wird an denselben Port
        let ziel = SocketAddr::new(endpunkte.gruppe, lokal.port());

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.handlers),
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
        );
        let task = tokio::spawn(dispatcher.empfangs_loop(Arc::clone(&socket), shutdown_rx));

        tracing::info!(lokal = %lokal, ziel = %ziel, "Knoten empfaengt");

        self.empfang = Some(Empfang {
            socket,
            ziel,
            shutdown_tx,
            task,
        });
        self.zustand = NodeZustand::Listening;
        Ok(())
    }

    /// Beendet den Empfang und schliesst den Socket (`-> Stopped`)
    ///
    /// Aus `Bound` wird der ungebundene Socket verworfen. Ein zweiter
    /// Aufruf ist ein No-op.
    pub async fn stop(&mut self) -> Result<()> {
        match self.zustand {
            NodeZustand::Stopped => return Ok(()),
            NodeZustand::Idle => {
                return Err(LncfError::UngueltigerZustand {
                    operation: "stop",
                    zustand: self.zustand.to_string(),
                })
            }
            NodeZustand::Bound | NodeZustand::Listening => {}
        }

        self.roh_socket = None;
        if let Some(empfang) = self.empfang.take() {
            let _ = empfang.shutdown_tx.send(());
            if let Err(e) = empfang.task.await {
                tracing::warn!(fehler = %e, "Empfangs-Task nicht sauber beendet");
            }
        }

        self.zustand = NodeZustand::Stopped;
        tracing::info!(statistik = %self.stats().zusammenfassung(), "Knoten gestoppt");
        Ok(())
    }

    /// Lokale Adresse des gebundenen Sockets (nur in `Listening`)
    pub fn lokale_adresse(&self) -> Option<SocketAddr> {
        self.empfang.as_ref().and_then(|e| e.socket.local_addr().ok())
    }

    // -----------------------------------------------------------------------
    // Handler
    // -----------------------------------------------------------------------

    /// Registriert den Handler fuer ein Topic
    ///
    /// # Fehler
    /// - `TopicTooLong` wenn das Topic nicht in ein Paket passt
    /// - `TopicAlreadyHandled` wenn es schon einen Handler gibt
    pub fn handle(&self, topic: &str, handler: impl Handler) -> Result<()> {
        topic_pruefen(topic)?;
        self.handlers.registrieren(topic, Arc::new(handler))?;
        tracing::debug!(topic = %topic, "Handler registriert");
        Ok(())
    }

    pub fn topics(&self) -> Vec<String> {
        self.handlers.topics()
    }

    // -----------------------------------------------------------------------
    // Senden
    // -----------------------------------------------------------------------

    fn sende_ziel(&self, operation: &'static str) -> Result<(&UdpSocket, SocketAddr)> {
        self.zustand_pruefen(operation, NodeZustand::Listening)?;
        self.empfang
            .as_ref()
            .map(|e| (e.socket.as_ref(), e.ziel))
            .ok_or_else(|| LncfError::UngueltigerZustand {
                operation,
                zustand: "Listening ohne Socket".to_string(),
            })
    }

    async fn senden(&self, operation: &'static str, paket: &[u8]) -> Result<()> {
        let (socket, ziel) = self.sende_ziel(operation)?;
        if let Err(e) = socket.send_to(paket, ziel).await {
            tracing::warn!(fehler = %e, ziel = %ziel, "UDP-Sendefehler");
            return Err(e.into());
        }
        self.stats.gesendet();
        tracing::trace!(bytes = paket.len(), ziel = %ziel, "Paket gesendet");
        Ok(())
    }

    /// Sendet eine Klartext-Nachricht an die Gruppe
    pub async fn send_clear(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let paket = encode_clear(topic, payload)?;
        self.senden("send_clear", &paket).await
    }

    /// Sendet eine verschluesselte Nachricht an die Gruppe
    ///
    /// Empfaenger ohne den Schluessel hinter `fingerprint` verwerfen sie.
    pub async fn send_encrypted(
        &self,
        topic: &str,
        payload: &[u8],
        fingerprint: &KeyFingerprint,
    ) -> Result<()> {
        let paket = EncryptedMessage::seal(&self.registry, fingerprint, topic, payload)?;
        self.senden("send_encrypted", &paket).await
    }

    /// Sendet eine Discovery-Anfrage (ohne Antwort-Mechanismus)
    pub async fn send_discovery_request(&self, request: &[u8]) -> Result<()> {
        let paket = DiscoveryMessage::new(request.to_vec()).encode()?;
        self.senden("send_discovery_request", &paket).await
    }

    // -----------------------------------------------------------------------
    // Schluessel
    // -----------------------------------------------------------------------

    pub fn register_key(&self, key: &[u8]) -> KeyFingerprint {
        self.registry.register(key)
    }

    pub fn generate_key(&self) -> KeyFingerprint {
        self.registry.generate()
    }

    pub fn unregister_key(&self, fingerprint: &KeyFingerprint) -> bool {
        self.registry.unregister(fingerprint)
    }

    pub fn fingerprints(&self) -> Vec<KeyFingerprint> {
        self.registry.fingerprints()
    }

    pub fn registry(&self) -> &Arc<KeyRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for LncfNode {
    fn drop(&mut self) {
        if let Some(empfang) = self.empfang.take() {
            let _ = empfang.shutdown_tx.send(());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
