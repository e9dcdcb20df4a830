//! Comando `sample`

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use conll_core::corpus::sample_document;

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Arquivo de saída (padrão: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl SampleArgs {
    pub fn execute(&self) -> Result<()> {
        let json = sample_document().to_json_string()?;
        match &self.output {
            Some(path) => {
                fs::write(path, json).with_context(|| format!("falha ao escrever {}", path.display()))?;
                eprintln!("Documento de exemplo escrito em {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
