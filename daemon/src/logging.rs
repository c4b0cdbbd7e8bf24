//! Structured Logging Setup via tracing-subscriber
//!
//! Umgebungsvariablen haben Vorrang vor der Konfigurationsdatei:
//! - `LNCF_LOG_LEVEL`: Filter-Direktive (z.B. `debug` oder `lncf_node=trace`)
//! - `LNCF_LOG_FORMAT`: Format (text/json)

use tracing_subscriber::{fmt, EnvFilter};

/// Initialisiert das Logging-System.
///
/// Faellt auf `info` zurueck, wenn weder Umgebung noch Konfiguration
/// einen gueltigen Filter liefern.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env("LNCF_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format_aus_env(format).as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Log-Format aus der Umgebung, sonst `standard`
pub fn log_format_aus_env(standard: &str) -> String {
    std::env::var("LNCF_LOG_FORMAT").unwrap_or_else(|_| standard.to_string())
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_werte() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(log_level_gueltig(level));
        }
        assert!(!log_level_gueltig("verbose"));
        assert!(!log_level_gueltig("INFO")); // Gross-/Kleinschreibung
        assert!(!log_level_gueltig(""));
    }

    #[test]
    fn log_format_werte() {
        assert!(log_format_gueltig("text"));
        assert!(log_format_gueltig("json"));
        assert!(!log_format_gueltig("xml"));
        assert!(!log_format_gueltig("JSON"));
    }

    #[test]
    fn log_format_umgebung_hat_vorrang() {
        std::env::remove_var("LNCF_LOG_FORMAT");
        assert_eq!(log_format_aus_env("text"), "text");
        std::env::set_var("LNCF_LOG_FORMAT", "json");
        assert_eq!(log_format_aus_env("text"), "json");
        std::env::remove_var("LNCF_LOG_FORMAT");
    }
}
