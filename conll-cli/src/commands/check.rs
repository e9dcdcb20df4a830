//! Comando `check`

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use conll_core::{BioViolation, TableReader};
use serde::Serialize;
use tracing::info;

use super::FormatArgs;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Arquivo CoNLL a verificar
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Imprime o resumo em JSON
    #[arg(long)]
    pub json: bool,
}

/// Resultado da verificação de um arquivo.
#[derive(Debug, Serialize)]
pub struct CheckSummary {
    pub file: PathBuf,
    pub sentences: usize,
    pub rows: usize,
    pub violations: Vec<BioViolation>,
}

impl CheckArgs {
    pub fn execute(&self) -> Result<()> {
        let summary = self.run()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            for v in &summary.violations {
                println!(
                    "linha {}: `{}` depois de `{}` na camada `{}`",
                    v.line, v.label, v.previous, v.layer
                );
            }
            println!(
                "{}: {} sentença(s), {} linha(s), {} violação(ões) BIO",
                summary.file.display(),
                summary.sentences,
                summary.rows,
                summary.violations.len()
            );
        }

        if !summary.violations.is_empty() {
            bail!("{} violação(ões) BIO em {}", summary.violations.len(), self.file.display());
        }
        Ok(())
    }

    fn run(&self) -> Result<CheckSummary> {
        let config = self.format.load_config()?.resolve().context("configuração inválida")?;
        let bytes = fs::read(&self.file).with_context(|| format!("falha ao ler {}", self.file.display()))?;

        let reader = TableReader::new(&config);
        let text = reader.decode(&bytes);
        let sentences = reader
            .parse_str(&text)
            .with_context(|| format!("tabela inválida em {}", self.file.display()))?;
        let violations = reader.bio_violations(&sentences);
        info!(sentences = sentences.len(), violations = violations.len(), "arquivo verificado");

        Ok(CheckSummary {
            file: self.file.clone(),
            sentences: sentences.len(),
            rows: sentences.iter().map(|s| s.rows.len()).sum(),
            violations,
        })
    }
}
