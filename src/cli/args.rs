// CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

/// Build a JUnit XML report from a test runner's event stream
#[derive(Parser, Debug)]
#[command(name = "junitfmt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build a JUnit XML report from newline-delimited JSON test events",
    long_about = None
)]
pub struct Cli {
    /// File with newline-delimited JSON events (reads stdin when omitted or "-")
    #[arg(value_name = "EVENTS")]
    pub events: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Indentation width for the XML (0 = single line)
    #[arg(long, value_name = "SPACES")]
    pub indent: Option<usize>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Print shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

impl Cli {
    /// Events path, `None` meaning stdin
    pub fn events_path(&self) -> Option<&PathBuf> {
        self.events.as_ref().filter(|p| p.as_os_str() != "-")
    }
}
