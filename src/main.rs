// Main entry point for junitfmt

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing::{debug, info};

use junitfmt::cli::Cli;
use junitfmt::config::{self, Config};
use junitfmt::{EventReader, Formatter, JunitFormatter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    junitfmt::logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting junitfmt v{}", env!("CARGO_PKG_VERSION"));
    }

    let loaded = Config::load();

    if cli.config {
        print_config(&cli, loaded.as_ref());
        return Ok(());
    }

    if let Some(config_file) = &cli.init_config {
        let toml_content = Config::default().to_toml();
        std::fs::write(config_file, toml_content).with_context(|| {
            format!("Failed to write configuration file: {}", config_file.display())
        })?;
        println!("Configuration file created: {}", config_file.display());
        return Ok(());
    }

    if let Some(shell_type) = &cli.completion {
        return handle_completion(shell_type);
    }

    let config = loaded.unwrap_or_default();
    run(&cli, &config)
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let mut options = config.junit_options();
    if let Some(indent) = cli.indent {
        options.indent = indent;
    }

    let input: Box<dyn BufRead> = match cli.events_path() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open events file: {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let mut formatter = JunitFormatter::with_options(options);
    let mut count = 0usize;
    for event in EventReader::new(input) {
        let event = event?;
        debug!(kind = event.kind(), "Event received");
        formatter.update(&event);
        count += 1;
    }
    debug!("Processed {} events", count);

    if !formatter.is_finished() {
        bail!("Event stream ended without a finish event; no report written");
    }

    match config.output_path(cli.output.as_deref()) {
        Some(path) => {
            formatter.write_to(&path)?;
            info!("JUnit report written to {}", path.display());
        }
        None => {
            let xml = formatter.output()?;
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(xml.as_bytes())
                .context("Failed to write JUnit XML to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn print_config(cli: &Cli, loaded: Option<&Config>) {
    let effective = loaded.cloned().unwrap_or_default();

    println!("Current configuration:");
    match loaded {
        Some(_) => println!("\n  Configuration file loaded"),
        None => {
            println!("\n  No configuration file loaded");
            println!("  Create one with: junitfmt --init-config .junitfmtrc.toml");
        }
    }

    let indent = cli.indent.unwrap_or(effective.report.indent);
    println!("\n  Report:");
    if effective.report.suite_name.is_empty() {
        println!("    Fallback suite name: (empty)");
    } else {
        println!("    Fallback suite name: {}", effective.report.suite_name);
    }
    println!("    Default failure type: {}", effective.report.default_cause_type);
    println!("    Indent: {}", indent);

    println!("\n  Output:");
    match effective.output_path(cli.output.as_deref()) {
        Some(path) => println!("    Path: {}", path.display()),
        None => println!("    Path: stdout"),
    }
    if std::env::var_os(config::ENV_JUNITFMT_OUTPUT).is_none() {
        println!("    {}: not set", config::ENV_JUNITFMT_OUTPUT);
    }

    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Configuration file");
    println!("  3. Environment variables");
    println!("  4. Built-in defaults (lowest)");
}

fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => bail!("Unsupported shell type '{}'", shell_type),
    };

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());

    Ok(())
}
