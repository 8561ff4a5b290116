use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::input_classifier::Sensitivities;
use crate::key_output::PanelKeys;
use crate::panel::PANEL_COUNT;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Serial number of the pad to open.
    #[serde(default)]
    pub serial: Option<String>,

    /// Press thresholds, ordered left, down, up, right.
    pub sensitivities: Sensitivities,

    /// LED segment files, ordered left, down, up, right. Relative paths are
    /// resolved against the configuration file's directory.
    pub led_files: [PathBuf; PANEL_COUNT],

    /// Keys typed by the panels, ordered left, down, up, right. Without it
    /// the pad only drives its lights.
    #[serde(default)]
    pub keys: Option<PanelKeys>,

    /// USB transfer timeout; 0 blocks indefinitely.
    #[serde(default)]
    pub transfer_timeout_ms: u64,

    /// How often `run` logs the sample and write rates.
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

fn default_report_interval_ms() -> u64 {
    1000
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadingFile {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::from_yaml(&contents)?;
        if let Some(base) = path.parent() {
            for file in config.led_files.iter_mut() {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        if config.report_interval_ms == 0 {
            return Err(ConfigError::ReportInterval);
        }
        Ok(config)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file from path '{}'", .path.display())]
    ReadingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    ParsingConfig(#[from] serde_yaml::Error),

    #[error("report_interval_ms must be greater than zero")]
    ReportInterval,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_output::PadKey;

    const MINIMAL: &str = "\
sensitivities: [300, 300, 250, 300]
led_files: [left.yml, down.yml, up.yml, right.yml]
";

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.serial, None);
        assert_eq!(config.keys, None);
        assert_eq!(config.sensitivities, [300, 300, 250, 300]);
        assert_eq!(config.transfer_timeout(), Duration::ZERO);
        assert_eq!(config.report_interval(), Duration::from_secs(1));
        assert_eq!(config.led_files[2], PathBuf::from("up.yml"));
    }

    #[test]
    fn full_config() {
        let config = Config::from_yaml(
            "serial: \"2051316B4E30\"\n\
             sensitivities: [1, 2, 3, 4]\n\
             led_files: [/a, /b, /c, /d]\n\
             keys: [left, down, up, right]\n\
             transfer_timeout_ms: 250\n\
             report_interval_ms: 500\n",
        )
        .unwrap();
        assert_eq!(config.serial.as_deref(), Some("2051316B4E30"));
        assert_eq!(
            config.keys,
            Some([PadKey::Left, PadKey::Down, PadKey::Up, PadKey::Right])
        );
        assert_eq!(config.transfer_timeout(), Duration::from_millis(250));
        assert_eq!(config.report_interval(), Duration::from_millis(500));
    }

    #[test]
    fn rejects_wrong_panel_count_and_unknown_keys() {
        let three = "sensitivities: [1, 2, 3]\nled_files: [a, b, c, d]\n";
        assert!(matches!(
            Config::from_yaml(three),
            Err(ConfigError::ParsingConfig(_))
        ));

        let unknown = format!("{MINIMAL}brightness: 3\n");
        assert!(matches!(
            Config::from_yaml(&unknown),
            Err(ConfigError::ParsingConfig(_))
        ));

        let zero_interval = format!("{MINIMAL}report_interval_ms: 0\n");
        assert!(matches!(
            Config::from_yaml(&zero_interval),
            Err(ConfigError::ReportInterval)
        ));
    }
}
