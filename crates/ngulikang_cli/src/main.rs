//! `ngulikang-seed`: populate a marketplace database with fixture data.
//!
//! Prints one progress line per seed step and exits non-zero on the first
//! unrecovered error. With `--json`, stdout carries only the final report and
//! progress lines move to stderr.

use clap::Parser;
use ngulikang_core::{
    default_log_level, init_logging, seed_database, Argon2Hasher, SeedConfig, SeedReport,
    StepOutcome, StepReport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "ngulikang-seed", version, about = "Seed the Ngulikang database with fixtures")]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long, env = "NGULIKANG_DB", default_value = "ngulikang.db")]
    db: PathBuf,

    /// JSON file overriding the default fixture sizes and passwords.
    #[arg(long, env = "NGULIKANG_CONFIG")]
    config: Option<PathBuf>,

    /// Absolute directory for rotating log files. Logging is off when unset.
    #[arg(long, env = "NGULIKANG_LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, env = "NGULIKANG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Seed for the fixture RNG, for reproducible profile attributes.
    #[arg(long, env = "NGULIKANG_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "NGULIKANG_ADMINS")]
    admins: Option<usize>,

    #[arg(long, env = "NGULIKANG_TRADESPEOPLE")]
    tradespeople: Option<usize>,

    #[arg(long, env = "NGULIKANG_CUSTOMERS")]
    customers: Option<usize>,

    #[arg(long, env = "NGULIKANG_APPLICATIONS")]
    applications: Option<usize>,

    #[arg(long, env = "NGULIKANG_PRODUCTS")]
    products: Option<usize>,

    #[arg(long, env = "NGULIKANG_ORDERS")]
    orders: Option<usize>,

    #[arg(long, env = "NGULIKANG_PAYROLL_ENTRIES")]
    payroll_entries: Option<usize>,

    #[arg(long, env = "NGULIKANG_PENDING_PAYROLL_ENTRIES")]
    pending_payroll_entries: Option<usize>,

    #[arg(long, env = "NGULIKANG_CHAT_THREADS")]
    chat_threads: Option<usize>,

    #[arg(long, env = "NGULIKANG_NOTIFICATIONS")]
    notifications: Option<usize>,

    #[arg(long, env = "NGULIKANG_CART_ITEMS")]
    cart_items: Option<usize>,

    /// Print the final report as JSON on stdout; progress goes to stderr.
    #[arg(long, env = "NGULIKANG_JSON")]
    json: bool,
}

impl Cli {
    /// Defaults, then the config file, then explicit flags.
    fn seed_config(&self) -> Result<SeedConfig, String> {
        let mut config = match &self.config {
            Some(path) => SeedConfig::from_json_file(path).map_err(|err| err.to_string())?,
            None => SeedConfig::default(),
        };

        let overrides = [
            (self.admins, &mut config.admins),
            (self.tradespeople, &mut config.tradespeople),
            (self.customers, &mut config.customers),
            (self.applications, &mut config.applications),
            (self.products, &mut config.products),
            (self.orders, &mut config.orders),
            (self.payroll_entries, &mut config.payroll_entries),
            (self.pending_payroll_entries, &mut config.pending_payroll_entries),
            (self.chat_threads, &mut config.chat_threads),
            (self.notifications, &mut config.notifications),
            (self.cart_items, &mut config.cart_items),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value;
            }
        }
        Ok(config)
    }
}

/// Routes human-readable lines away from stdout when stdout carries JSON.
struct Console<O, E> {
    json: bool,
    out: O,
    err: E,
}

impl<O: Write, E: Write> Console<O, E> {
    fn status(&mut self, line: &str) -> io::Result<()> {
        if self.json {
            writeln!(self.err, "{line}")
        } else {
            writeln!(self.out, "{line}")
        }
    }

    fn step(&mut self, report: &StepReport) -> io::Result<()> {
        let line = match report.outcome {
            StepOutcome::Seeded { records } => {
                format!("Seeded {} ({records} new records).", report.step)
            }
            StepOutcome::Skipped => format!("Skipped {} (already populated).", report.step),
        };
        self.status(&line)
    }

    fn finish(&mut self, report: &SeedReport) -> io::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut self.out, report)?;
            writeln!(self.out)?;
        }
        self.status(&format!(
            "Seeding completed: {} customers, {} tradespeople.",
            report.customers.len(),
            report.tradespeople.len()
        ))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config = match cli.seed_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut console = Console {
        json: cli.json,
        out: io::stdout().lock(),
        err: io::stderr().lock(),
    };
    let mut write_error = None;

    if let Err(err) = console.status("Seeding started...") {
        write_error = Some(err);
    }
    let result = seed_database(&cli.db, config, &Argon2Hasher::default(), rng, |step| {
        if let Err(err) = console.step(step) {
            write_error.get_or_insert(err);
        }
    });

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            log::error!("event=seed_run module=cli status=error error={err}");
            eprintln!("seeding failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = console.finish(&report) {
        write_error.get_or_insert(err);
    }
    match write_error {
        Some(err) => {
            eprintln!("failed to write output: {err}");
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Console};
    use clap::Parser;
    use ngulikang_core::seed::HashError;
    use ngulikang_core::{CredentialHasher, SeedConfig, Seeder, SqliteStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, plaintext: &str) -> Result<String, HashError> {
            Ok(plaintext.to_string())
        }
    }

    fn run_console(json: bool) -> (Vec<u8>, Vec<u8>) {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut console = Console {
            json,
            out: Vec::new(),
            err: Vec::new(),
        };

        console.status("Seeding started...").unwrap();
        let report = Seeder::new(&store, &PlainHasher, StdRng::seed_from_u64(1), SeedConfig::default())
            .run_with_progress(|step| console.step(step).unwrap())
            .unwrap();
        console.finish(&report).unwrap();
        (console.out, console.err)
    }

    #[test]
    fn json_mode_keeps_stdout_machine_readable() {
        let (out, err) = run_console(true);

        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["customers"].as_array().unwrap().len(), 20);
        assert_eq!(report["steps"][0]["step"], "accounts");

        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("Seeding started..."));
        assert!(err.contains("Seeded orders (10 new records)."));
        assert!(err.contains("Seeding completed: 20 customers, 10 tradespeople."));
    }

    #[test]
    fn text_mode_prints_progress_on_stdout() {
        let (out, err) = run_console(false);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Seeded accounts (23 new records)."));
        assert!(out.ends_with("Seeding completed: 20 customers, 10 tradespeople.\n"));
        assert!(err.is_empty());
    }

    #[test]
    fn flags_override_config_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{ "orders": 4, "products": 2 }"#).unwrap();

        let cli = Cli::parse_from([
            "ngulikang-seed",
            "--config",
            path.to_str().unwrap(),
            "--orders",
            "6",
            "--cart-items",
            "1",
        ]);
        let config = cli.seed_config().unwrap();
        assert_eq!(config.orders, 6);
        assert_eq!(config.products, 2);
        assert_eq!(config.cart_items, 1);
        assert_eq!(config.customers, 20);
    }
}
