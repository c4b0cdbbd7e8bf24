//! lncfd – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Knoten.

use anyhow::Result;
use lncf_daemon::config::{KonfigQuelle, LncfConfig};
use lncf_daemon::logging::logging_initialisieren;
use lncf_daemon::Daemon;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("LNCF_CONFIG").unwrap_or_else(|_| "lncf.toml".into());

    let (config, quelle) = LncfConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    if quelle == KonfigQuelle::Standardwerte {
        tracing::warn!(
            pfad = %config_pfad,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "lncfd wird initialisiert"
    );

    Daemon::neu(config).starten().await
}
