//! Comando `convert`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};
use clap::Args;
use conll_core::{ConllPipeline, Document, PipelineEvent};
use tracing::{debug, error, info};

use super::FormatArgs;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Arquivos JSON com um documento ou uma lista de documentos
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Diretório de destino
    #[arg(short, long = "dest", value_name = "DIR")]
    pub dest: PathBuf,

    #[command(flatten)]
    pub format: FormatArgs,

    /// Converte documentos e sentenças em paralelo
    #[arg(short, long)]
    pub parallel: bool,

    /// Número de threads do modo paralelo (padrão: uma por núcleo)
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,
}

impl ConvertArgs {
    pub fn execute(&self) -> Result<()> {
        let config = self.format.load_config()?;
        let pipeline = ConllPipeline::new(&config)
            .context("configuração inválida")?
            .with_parallel(self.parallel || config.parallel);

        if let Some(threads) = self.threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .context("falha ao configurar as threads")?;
        }

        let mut failures = 0;
        let mut documents = Vec::new();
        for input in &self.inputs {
            match load_documents(input) {
                Ok(mut docs) => {
                    debug!(input = %input.display(), documents = docs.len(), "entrada lida");
                    documents.append(&mut docs);
                }
                Err(e) => {
                    error!("{e:#}");
                    failures += 1;
                }
            }
        }

        let (tx, rx) = mpsc::channel();
        let logger = thread::spawn(move || {
            for event in rx {
                log_event(&event);
            }
        });
        let results = pipeline.convert_streaming(&documents, &self.dest, tx);
        // o canal fecha quando o pipeline solta o último Sender
        let _ = logger.join();

        let mut written = 0;
        for result in &results {
            match result {
                Ok(report) => {
                    written += 1;
                    if let Some(path) = &report.path {
                        println!("{} ({} sentenças, {} linhas)", path.display(), report.sentences, report.rows);
                    }
                }
                Err(e) => {
                    error!("{e}");
                    failures += 1;
                }
            }
        }

        println!("{written} documento(s) escrito(s), {failures} falha(s)");
        if failures > 0 {
            bail!("{failures} entrada(s) ou documento(s) falharam");
        }
        Ok(())
    }
}

fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let json = fs::read_to_string(path).with_context(|| format!("falha ao ler {}", path.display()))?;
    Document::from_json_str(&json).with_context(|| format!("JSON inválido em {}", path.display()))
}

fn log_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::DocumentStarted { document, sentences } => {
            info!(%document, sentences, "iniciando documento");
        }
        PipelineEvent::SentenceEncoded { document, sentence, tokens } => {
            debug!(%document, sentence, tokens, "sentença codificada");
        }
        PipelineEvent::DocumentWritten {
            document,
            rows,
            processing_ms,
            ..
        } => {
            info!(%document, rows, ms = processing_ms, "documento concluído");
        }
        PipelineEvent::DocumentFailed { document, message } => {
            debug!(%document, %message, "documento falhou");
        }
    }
}
