//! vaultedit CLI - drive a vault editing session from the command line.
//!
//! This tool replays scripted editing actions against a decrypted vault
//! snapshot and reports whether the result differs from the original.

mod sample;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use vaultedit_facade::VaultFacade;
use vaultedit_vault::{Action, Collaborators, FingerprintComparator, SessionConfig, VaultSession};

#[derive(Parser)]
#[command(name = "vaultedit")]
#[command(about = "vaultedit - In-memory vault editing sessions")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the demo vault snapshot as JSON.
    Sample {
        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a JSON action script against a snapshot.
    Apply {
        /// Source snapshot (JSON).
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Action script (JSON array).
        #[arg(short = 'a', long)]
        script: PathBuf,

        /// Session configuration (JSON).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the updated vault (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the content fingerprint of a snapshot.
    Fingerprint {
        /// Snapshot (JSON).
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Check whether two snapshots have the same content.
    Compare {
        /// First snapshot (JSON).
        a: PathBuf,

        /// Second snapshot (JSON).
        b: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sample { output } => cmd_sample(output.as_deref()),

        Commands::Apply {
            snapshot,
            script,
            config,
            output,
        } => cmd_apply(&snapshot, &script, config.as_deref(), output.as_deref()).map(|_| ()),

        Commands::Fingerprint { snapshot } => cmd_fingerprint(&snapshot),

        Commands::Compare { a, b } => cmd_compare(&a, &b),
    }
}

/// Load and validate a snapshot file.
fn load_snapshot(path: &Path) -> Result<VaultFacade> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let vault = VaultFacade::from_json(&json)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    vault
        .validate()
        .with_context(|| format!("Malformed vault in {}", path.display()))?;
    Ok(vault)
}

/// Write text to a file, or to stdout when no path is given.
fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

/// Write the demo vault.
fn cmd_sample(output: Option<&Path>) -> Result<()> {
    let vault = sample::sample_vault();
    write_output(output, &vault.to_json()?)?;
    info!(
        groups = vault.groups.len(),
        entries = vault.entries.len(),
        "Sample vault written"
    );
    Ok(())
}

/// Replay a script. Returns the number of updates the session emitted.
fn cmd_apply(
    snapshot: &Path,
    script: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<usize> {
    let source = load_snapshot(snapshot)?;

    let config = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SessionConfig::from_json(&json).context("Invalid session config")?
        }
        None => SessionConfig::default(),
    };

    let script_json = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let actions = Action::parse_script(&script_json).context("Invalid action script")?;

    let updates = Rc::new(RefCell::new(0usize));
    let mut session = {
        let updates = updates.clone();
        VaultSession::with_config(
            source,
            config,
            Collaborators::default(),
            move |_: &VaultFacade| *updates.borrow_mut() += 1,
        )?
    };

    info!(actions = actions.len(), "Replaying script");
    for action in actions {
        session.dispatch(action);
    }

    let emitted = *updates.borrow();
    let comparator = FingerprintComparator::default();
    if comparator.unchanged(session.source(), session.vault()) {
        info!(updates = emitted, "No net changes to vault");
    } else {
        write_output(output, &session.vault().to_json()?)?;
        info!(updates = emitted, "Vault changed");
    }
    Ok(emitted)
}

/// Print a snapshot's fingerprint.
fn cmd_fingerprint(snapshot: &Path) -> Result<()> {
    let vault = load_snapshot(snapshot)?;
    let comparator = FingerprintComparator::default();
    println!("{}", comparator.fingerprint(&vault));
    Ok(())
}

/// Compare two snapshots.
fn cmd_compare(a: &Path, b: &Path) -> Result<()> {
    let a = load_snapshot(a)?;
    let b = load_snapshot(b)?;
    let comparator = FingerprintComparator::default();
    if comparator.unchanged(&a, &b) {
        println!("unchanged");
    } else {
        println!("changed");
    }
    Ok(())
}
