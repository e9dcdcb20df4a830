//! Linha de comando `conll`: converte documentos anotados (JSON) em tabelas CoNLL

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Commands;

/// Conversor de spans anotados para tabelas CoNLL (BIO)
#[derive(Debug, Parser)]
#[command(name = "conll", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mostra apenas erros
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Aumenta o detalhamento dos logs (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG tem precedência sobre -v/-q
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli.command.execute()
}
