//! Daemon-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, der Daemon laeuft also auch ohne Konfigurationsdatei.
//!
//! ```toml
//! [netzwerk]
//! listen_adresse = "0.0.0.0"
//! gruppen_adresse = "239.255.66.66"
//! port = 6666
//!
//! [schluessel]
//! keys = ["AAECAwQFBgcICQoLDA0ODw=="]
//! generieren = false
//!
//! [themen]
//! abonniert = ["temp"]
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};

use crate::logging::{log_format_gueltig, log_level_gueltig};

/// Herkunft einer geladenen Konfiguration
///
/// `laden` laeuft vor der Logging-Initialisierung; der Aufrufer meldet
/// fehlende Dateien erst, wenn ein Subscriber installiert ist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KonfigQuelle {
    Datei,
    Standardwerte,
}

/// Vollstaendige Daemon-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LncfConfig {
    pub netzwerk: NetzwerkEinstellungen,
    pub schluessel: SchluesselEinstellungen,
    pub themen: ThemenEinstellungen,
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Lokale Adresse fuer den Bind (bestimmt auch die Adressfamilie)
    pub listen_adresse: String,
    /// Multicast-Gruppe, an die gesendet und der beigetreten wird
    pub gruppen_adresse: String,
    /// UDP-Port
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            listen_adresse: "0.0.0.0".into(),
            gruppen_adresse: "239.255.66.66".into(),
            port: lncf_node::DEFAULT_PORT,
        }
    }
}

/// Schluessel, die beim Start registriert werden
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchluesselEinstellungen {
    /// Base64-kodierte Schluessel
    pub keys: Vec<String>,
    /// Zusaetzlich einen Zufallsschluessel erzeugen
    pub generieren: bool,
}

/// Topics, fuer die ein protokollierender Handler registriert wird
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemenEinstellungen {
    pub abonniert: Vec<String>,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl LncfConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<(Self, KonfigQuelle)> {
        let (config, quelle) = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config = Self::aus_toml(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                (config, KonfigQuelle::Datei)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (Self::default(), KonfigQuelle::Standardwerte)
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.validieren()?;
        Ok((config, quelle))
    }

    /// Parst eine Konfiguration aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(inhalt)?)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level: '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format: '{}'", self.logging.format);
        }
        if let Some(topic) = self.themen.abonniert.iter().find(|t| t.len() > lncf_core::MAX_TOPIC_LAENGE) {
            anyhow::bail!("Topic zu lang ({} Bytes): '{topic}'", topic.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = LncfConfig::default();
        assert_eq!(cfg.netzwerk.listen_adresse, "0.0.0.0");
        assert_eq!(cfg.netzwerk.gruppen_adresse, "239.255.66.66");
        assert_eq!(cfg.netzwerk.port, 6666);
        assert!(cfg.schluessel.keys.is_empty());
        assert!(!cfg.schluessel.generieren);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.validieren().is_ok());
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [netzwerk]
            port = 7000

            [schluessel]
            keys = ["AAECAwQFBgcICQoLDA0ODw=="]

            [themen]
            abonniert = ["temp", "druck"]
        "#;
        let cfg = LncfConfig::aus_toml(toml).unwrap();
        assert_eq!(cfg.netzwerk.port, 7000);
        assert_eq!(cfg.schluessel.keys.len(), 1);
        assert_eq!(cfg.themen.abonniert, vec!["temp", "druck"]);
        // Nicht angegebene Felder behalten Standardwerte
        assert_eq!(cfg.netzwerk.gruppen_adresse, "239.255.66.66");
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn kaputtes_toml() {
        assert!(LncfConfig::aus_toml("[netzwerk\nport = ").is_err());
        assert!(LncfConfig::aus_toml("[netzwerk]\nport = \"viel\"").is_err());
    }

    #[test]
    fn ungueltiges_log_level() {
        let cfg = LncfConfig::aus_toml("[logging]\nlevel = \"laut\"").unwrap();
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn zu_langes_topic() {
        let mut cfg = LncfConfig::default();
        cfg.themen.abonniert.push("t".repeat(256));
        assert!(cfg.validieren().is_err());
    }

    #[test]
    fn fehlende_datei_ergibt_standardwerte() {
        let (cfg, quelle) = LncfConfig::laden("/nicht/vorhanden/lncf.toml").unwrap();
        assert_eq!(cfg.netzwerk.port, 6666);
        assert_eq!(quelle, KonfigQuelle::Standardwerte);
    }

    #[test]
    fn vorhandene_datei_wird_gelesen() {
        let pfad = std::env::temp_dir().join(format!("lncf-datei-{}.toml", std::process::id()));
        std::fs::write(&pfad, "[netzwerk]\nport = 7001\n").unwrap();
        let (cfg, quelle) = LncfConfig::laden(&pfad.to_string_lossy()).unwrap();
        assert_eq!(cfg.netzwerk.port, 7001);
        assert_eq!(quelle, KonfigQuelle::Datei);
        std::fs::remove_file(&pfad).unwrap();
    }

    #[test]
    fn fehler_nennt_den_pfad() {
        let pfad = std::env::temp_dir().join(format!("lncf-test-{}.toml", std::process::id()));
        std::fs::write(&pfad, "[logging\n").unwrap();
        let pfad_str = pfad.to_string_lossy().to_string();
        let err = LncfConfig::laden(&pfad_str).unwrap_err();
        assert!(err.to_string().contains(&pfad_str));
        std::fs::remove_file(&pfad).unwrap();
    }
}
