//! Persisted configuration loading.
//!
//! Options may live in a `.futurelint.toml` at the project root or in a
//! `[tool.futurelint]` table of `pyproject.toml`. Values are kept raw
//! here; validation happens when they are resolved into checker settings.

use serde::Deserialize;
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = ".futurelint.toml";
const PYPROJECT_FILENAME: &str = "pyproject.toml";

/// Top-level configuration struct.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// The `[futurelint]` table.
    #[serde(default)]
    pub futurelint: FuturelintConfig,
    /// Where this configuration was loaded from; `None` for defaults.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

/// Raw option values from a configuration file.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct FuturelintConfig {
    /// Only evaluate files with more than comments and (doc)strings.
    pub require_code: Option<bool>,
    /// Minimum supported Python version, e.g. `"2.7"`.
    pub min_version: Option<String>,
    /// Only alert when relevant features are used.
    pub require_used: Option<bool>,
    /// Diagnostic codes (or code prefixes) to ignore.
    pub ignore: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
struct PyProject {
    tool: ToolConfig,
}

#[derive(Debug, Deserialize, Clone)]
struct ToolConfig {
    futurelint: FuturelintConfig,
}

impl Config {
    /// Loads configuration from the current directory upward.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from `path` and traversing up until a
    /// config file is found. Falls back to defaults.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let futurelint_toml = current.join(CONFIG_FILENAME);
            if futurelint_toml.exists() {
                if let Ok(content) = fs::read_to_string(&futurelint_toml) {
                    if let Ok(mut config) = toml::from_str::<Config>(&content) {
                        config.config_file_path = Some(futurelint_toml);
                        return config;
                    }
                }
            }

            let pyproject_toml = current.join(PYPROJECT_FILENAME);
            if pyproject_toml.exists() {
                if let Ok(content) = fs::read_to_string(&pyproject_toml) {
                    if let Ok(pyproject) = toml::from_str::<PyProject>(&content) {
                        return Config {
                            futurelint: pyproject.tool.futurelint,
                            config_file_path: Some(pyproject_toml),
                        };
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }
}
