// Configuration file handling

use crate::report::JunitOptions;
use crate::report::junit::DEFAULT_CAUSE_TYPE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Suite name used when the stream never sends a start event
    #[serde(default)]
    pub suite_name: String,

    /// Failure type when the cause carries none
    #[serde(default = "default_cause_type")]
    pub default_cause_type: String,

    /// Indentation width (0 = single line)
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            suite_name: String::new(),
            default_cause_type: default_cause_type(),
            indent: default_indent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Report file; stdout when unset
    #[serde(default)]
    pub path: Option<String>,
}

// Default values
pub const ENV_JUNITFMT_OUTPUT: &str = "JUNITFMT_OUTPUT";

pub fn default_cause_type() -> String {
    String::from(DEFAULT_CAUSE_TYPE)
}

pub fn default_indent() -> usize {
    2
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .junitfmtrc (current directory)
        // 2. ~/.junitfmtrc (home directory)
        // 3. .junitfmtrc.toml (current directory)
        // 4. ~/.junitfmtrc.toml (home directory)

        let cwd = std::env::current_dir().ok()?;
        let home = dirs::home_dir()?;

        let paths = [
            cwd.join(".junitfmtrc"),
            home.join(".junitfmtrc"),
            cwd.join(".junitfmtrc.toml"),
            home.join(".junitfmtrc.toml"),
        ];

        for path in &paths {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        None
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate default configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }

    pub fn junit_options(&self) -> JunitOptions {
        JunitOptions {
            fallback_suite_name: self.report.suite_name.clone(),
            default_cause_type: self.report.default_cause_type.clone(),
            indent: self.report.indent,
        }
    }

    /// Resolve the report destination: CLI, then config file, then environment
    pub fn output_path(&self, cli_output: Option<&Path>) -> Option<PathBuf> {
        cli_output
            .map(Path::to_path_buf)
            .or_else(|| self.output.path.as_ref().map(PathBuf::from))
            .or_else(|| std::env::var_os(ENV_JUNITFMT_OUTPUT).map(PathBuf::from))
    }
}
