//! CLI probe and maintenance entry point.
//!
//! # Responsibility
//! - Verify `catalog_core` linkage (`ping`).
//! - Run the category integrity scan against a database file (`check`).
//! - Run the on-demand audit retention purge (`purge-audit`).

use catalog_core::logging::init_logging_with;
use catalog_core::{
    open_db_with_options, AuditTrail, DbOptions, HierarchyService, LogSettings,
    SqliteAuditRepository, SqliteCategoryRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Library catalog maintenance probe
#[derive(Parser, Debug)]
#[command(name = "catalog_cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Absolute directory for rolling log files; logging stays off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level used with --log-dir
    #[arg(long, global = true, default_value_t = catalog_core::default_log_level().to_string())]
    log_level: String,

    /// Lock wait budget in milliseconds
    #[arg(long, global = true, default_value_t = 5_000)]
    busy_timeout_ms: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core health check and version
    Ping,

    /// Scan the category hierarchy for parent-link cycles
    Check {
        /// Path to the catalog database
        db: PathBuf,
    },

    /// Delete audit entries older than a cutoff
    PurgeAudit {
        /// Path to the catalog database
        db: PathBuf,
        /// Cutoff in Unix epoch milliseconds; older entries are removed
        cutoff_ms: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging_for_cli(&cli.log_level, log_dir)?;
    }
    let options =
        DbOptions::default().with_busy_timeout(Duration::from_millis(cli.busy_timeout_ms));

    match cli.command.unwrap_or(Command::Ping) {
        Command::Ping => {
            println!("catalog_core ping={}", catalog_core::ping());
            println!("catalog_core version={}", catalog_core::core_version());
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { db } => {
            let conn = open_db_with_options(&db, &options)?;
            let service = HierarchyService::new(SqliteCategoryRepository::try_new(&conn)?);
            let forest = service.snapshot()?;
            let cyclic = forest.detect_all_cycles();
            info!(
                "event=integrity_check module=cli status=ok categories={} cyclic={}",
                forest.len(),
                cyclic.len()
            );
            println!("categories={} cyclic={}", forest.len(), cyclic.len());
            for id in &cyclic {
                println!("cycle_member={id}");
            }
            Ok(if cyclic.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Command::PurgeAudit { db, cutoff_ms } => {
            let conn = open_db_with_options(&db, &options)?;
            let trail = AuditTrail::new(SqliteAuditRepository::try_new(&conn)?);
            let removed = trail.purge_older_than(cutoff_ms)?;
            println!("removed={removed}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging_for_cli(level: &str, log_dir: &str) -> Result<(), Box<dyn Error>> {
    let settings = LogSettings::parse(level, log_dir)?.with_stderr_mirror(true);
    init_logging_with(settings)?;
    Ok(())
}
