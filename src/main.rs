use anyhow::Result;
use clap::Parser;
use num_bigint::BigInt;
use serde::Serialize;
use shamir_recover::{load_share_set, recover, Field, FieldMode, Reconstruction};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Result from a command, separating human-readable output from the JSON result
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Readable report (input path, secret, field)
    pub output: String,
    /// Clean JSON result for scripting
    pub result: String,
}

#[derive(Parser)]
#[command(name = "shamir-recover")]
#[command(about = "Reconstruct a Shamir secret from a JSON share set", long_about = None)]
struct Cli {
    /// Path to the JSON share-set file
    file: PathBuf,

    /// Prime modulus (decimal) to interpolate over instead of deriving one
    #[arg(long)]
    modulus: Option<BigInt>,

    /// Run a Miller-Rabin check on --modulus before using it
    #[arg(long, requires = "modulus")]
    check_modulus: bool,

    /// Interpolate exactly over the rationals instead of a prime field
    #[arg(long, conflicts_with = "modulus")]
    rational: bool,

    /// Print only the JSON result
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn field_mode(&self) -> FieldMode {
        match (&self.modulus, self.rational) {
            (_, true) => FieldMode::Rational,
            (Some(p), false) if self.check_modulus => FieldMode::CheckedPrime(p.clone()),
            (Some(p), false) => FieldMode::Prime(p.clone()),
            (None, false) => FieldMode::Derived,
        }
    }
}

#[derive(Serialize)]
struct SecretOutput {
    secret: String,
    field: &'static str,
    modulus: Option<String>,
    k: usize,
    shares_used: usize,
}

impl SecretOutput {
    fn new(reconstruction: &Reconstruction, k: usize) -> Self {
        let (field, modulus) = match &reconstruction.field {
            Field::Prime(p) => ("prime", Some(p.to_string())),
            Field::Rational => ("rational", None),
        };
        Self {
            secret: reconstruction.secret.to_string(),
            field,
            modulus,
            k,
            shares_used: reconstruction.shares_used,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "shamir_recover=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<CommandResult> {
    let mut out = String::new();
    out.push_str(&format!(
        "--- Reading Test Case from: {} ---\n",
        cli.file.display()
    ));

    let share_set = load_share_set(&cli.file)?;
    let reconstruction = recover(&share_set, cli.field_mode())?;

    match &reconstruction.field {
        Field::Prime(p) => out.push_str(&format!(
            "The reconstructed secret is: {} (mod {})\n",
            reconstruction.secret, p
        )),
        Field::Rational => out.push_str(&format!(
            "The reconstructed secret is: {}\n",
            reconstruction.secret
        )),
    }

    let result = serde_json::to_string(&SecretOutput::new(&reconstruction, share_set.k))?;

    Ok(CommandResult {
        output: out,
        result,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cmd_result = run(&cli)?;

    if cli.json {
        println!("{}", cmd_result.result);
    } else {
        print!("{}", cmd_result.output);
    }

    Ok(())
}
