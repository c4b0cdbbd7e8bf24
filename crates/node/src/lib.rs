//! lncf-node – Ein LNCF-Knoten im Multicast-Netz
//!
//! Verbindet Paketformat, Schluessel-Registry und UDP-Socket zu einem
//! reaktiven Knoten: Topics abonnieren, Nachrichten senden, Datagramme
//! empfangen und an Handler verteilen.
//!
//! ## Module
//! - [`node`] – `LncfNode` mit Zustandsmaschine Idle -> Bound -> Listening -> Stopped
//! - [`dispatcher`] – Empfangs-Loop und Verteilung eingehender Datagramme
//! - [`handler`] – `Handler`-Trait und Topic -> Handler Tabelle
//! - [`socket`] – Adress-Validierung, Bind und Multicast-Beitritt
//! - [`stats`] – Lock-freie Zaehler fuer Empfang und Versand

pub mod dispatcher;
pub mod handler;
pub mod node;
pub mod socket;
pub mod stats;

pub use dispatcher::{Dispatcher, Zustellung};
pub use handler::{Handler, HandlerTable};
pub use node::{LncfNode, NodeZustand};
pub use socket::Endpunkte;
pub use stats::{NodeStats, StatsSnapshot};

pub use lncf_protocol::DEFAULT_PORT;
