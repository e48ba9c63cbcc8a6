//! Run configuration, read from `config.toml`.
//!
//! ```toml
//! [files]
//! names = ["TR1.csv", "TR2.csv", "GLEIF.csv"]
//! reference = "GLEIF.csv"
//!
//! [rates]
//! names = ["EONIA", "LIBOR"]
//!
//! [report]
//! top = 5
//! ```

use crate::aggregation::exposure::ExposureRequest;
use crate::core::error::PipelineError;
use crate::io::error::SourceError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Which files make up a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// File names to look for under the data root.
    pub names: Vec<String>,
    /// The one name among `names` that is the reference registry.
    #[serde(default = "default_reference")]
    pub reference: String,
}

fn default_reference() -> String {
    "GLEIF.csv".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Floating indices to aggregate.
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows shown in each top/bottom table.
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_top() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top: default_top() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub files: FilesConfig,
    pub rates: RatesConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, SourceError> {
        let config: Config = toml::from_str(content).map_err(|source| SourceError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Validate, then write as TOML.
    pub fn save(&self, path: &Path) -> Result<(), SourceError> {
        self.validate()?;
        let content = toml::to_string(self).map_err(|source| SourceError::TomlWrite {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.files.names.is_empty() {
            return Err(PipelineError::configuration("files.names is empty"));
        }
        if self.rates.names.is_empty() {
            return Err(PipelineError::configuration(
                "rates.names is empty, at least one filtering level is required",
            ));
        }
        if self.report.top == 0 {
            return Err(PipelineError::configuration("report.top must be positive"));
        }
        Ok(())
    }

    /// Country-level request for the configured rates.
    pub fn exposure_request(&self) -> Result<ExposureRequest, PipelineError> {
        ExposureRequest::new(self.rates.names.iter().map(String::as_str))
    }
}

/// First `config.toml` found under `root`, in sorted walk order.
pub fn find_config(root: &Path) -> Result<Option<PathBuf>, SourceError> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| SourceError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && entry.file_name() == CONFIG_FILE_NAME {
            debug!("using config {}", entry.path().display());
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[files]
names = ["TR1.csv", "GLEIF.csv"]

[rates]
names = ["EONIA", "LIBOR"]
"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = Config::from_toml(SAMPLE, Path::new("config.toml")).unwrap();
        assert_eq!(config.files.reference, "GLEIF.csv");
        assert_eq!(config.report.top, 5);
        assert_eq!(config.exposure_request().unwrap().indices().len(), 2);
    }

    #[test]
    fn test_empty_rates_rejected() {
        let content = r#"
[files]
names = ["TR1.csv"]

[rates]
names = []
"#;
        let err = Config::from_toml(content, Path::new("config.toml")).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Pipeline(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[files", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, SourceError::Toml { .. }));
    }

    #[test]
    fn test_find_config_in_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("settings");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join(CONFIG_FILE_NAME), SAMPLE).unwrap();

        let found = find_config(dir.path()).unwrap().unwrap();
        assert_eq!(found, nested.join(CONFIG_FILE_NAME));
        assert!(Config::load(&found).is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = Config {
            files: FilesConfig {
                names: vec!["TR \"north\", 1.csv".into(), "GLEIF.csv".into()],
                reference: "GLEIF.csv".into(),
            },
            rates: RatesConfig {
                names: vec!["EONIA".into()],
            },
            report: ReportConfig { top: 3 },
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.files.names, config.files.names);
        assert_eq!(loaded.rates.names, vec!["EONIA"]);
        assert_eq!(loaded.report.top, 3);
    }

    #[test]
    fn test_find_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config(dir.path()).unwrap().is_none());
    }
}
