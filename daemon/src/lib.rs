//! lncf-daemon – Bibliotheks-Root
//!
//! Baut aus einer `LncfConfig` einen laufenden Knoten: Schluessel
//! registrieren, Topics mit einem protokollierenden Handler abonnieren,
//! Multicast-Gruppe beitreten und bis Ctrl-C empfangen.

pub mod config;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::LncfConfig;
use lncf_crypto::{base64_decode, KeyRegistry};
use lncf_node::{Handler, LncfNode};

/// Haelt die Konfiguration bis zum Start zusammen
pub struct Daemon {
    pub config: LncfConfig,
}

/// Handler, der jede Nachricht als Log-Eintrag ausgibt
fn protokoll_handler() -> impl Handler {
    |topic: &str, payload: &[u8]| {
        tracing::info!(
            topic = %topic,
            bytes = payload.len(),
            inhalt = %String::from_utf8_lossy(payload),
            "Nachricht empfangen"
        );
    }
}

impl Daemon {
    pub fn neu(config: LncfConfig) -> Self {
        Self { config }
    }

    /// Registriert Schluessel und Handler und startet den Empfang
    pub async fn knoten_starten(&self) -> Result<LncfNode> {
        let registry = Arc::new(KeyRegistry::new());

        for (index, key) in self.config.schluessel.keys.iter().enumerate() {
            let bytes = base64_decode(key)
                .with_context(|| format!("Schluessel Nr. {} ist kein gueltiges Base64", index + 1))?;
            let fingerprint = registry.register(&bytes);
            tracing::info!(fingerprint = %fingerprint, "Schluessel aus Konfiguration registriert");
        }
        if self.config.schluessel.generieren {
            let fingerprint = registry.generate();
            tracing::info!(fingerprint = %fingerprint, "Zufallsschluessel erzeugt");
        }

        let mut node = LncfNode::new(registry);
        for topic in &self.config.themen.abonniert {
            node.handle(topic, protokoll_handler())
                .with_context(|| format!("Topic '{topic}' nicht abonnierbar"))?;
        }

        let netz = &self.config.netzwerk;
        node.init(&netz.listen_adresse, &netz.gruppen_adresse, netz.port)
            .context("Knoten-Initialisierung fehlgeschlagen")?;
        node.listen_and_serve()
            .await
            .with_context(|| format!("Bind/Beitritt auf {}:{} fehlgeschlagen", netz.gruppen_adresse, netz.port))?;

        Ok(node)
    }

    /// Startet den Knoten und laeuft bis zum Shutdown-Signal
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            listen = %self.config.netzwerk.listen_adresse,
            gruppe = %self.config.netzwerk.gruppen_adresse,
            port = self.config.netzwerk.port,
            topics = self.config.themen.abonniert.len(),
            "lncfd startet"
        );

        let mut node = self.knoten_starten().await?;

        tracing::info!("lncfd laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Knoten wird gestoppt");

        node.stop().await?;
        tracing::info!(statistik = %node.stats().zusammenfassung(), "lncfd beendet");
        Ok(())
    }
}
