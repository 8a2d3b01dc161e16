//! Shellwright terminal front end.

pub mod interactive;

use shellwright_config::{AppConfig, ConfigError};

/// The message shown when startup cannot continue, with the config path the
/// operator can edit.
pub fn startup_error_report(err: &ConfigError) -> String {
    format!(
        "ERROR: {err}\nConfig file: {}",
        AppConfig::config_dir().join("config.toml").display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_report_names_error_once() {
        let report = startup_error_report(&ConfigError::MissingApiKey);
        assert_eq!(report.matches("No API key found").count(), 1);
        assert!(report.starts_with("ERROR: "));
        assert!(report.contains("config.toml"));
        assert!(!report.contains("MissingApiKey"));
    }
}
