//! # Pipeline de Conversão com Eventos Observáveis
//!
//! O pipeline coordena os módulos (spans → BIO → linhas → tabela) e emite
//! eventos a cada passo por um canal Rust (`mpsc`), permitindo que a linha de
//! comando mostre o progresso enquanto os documentos são convertidos.
//!
//! ## Fluxo por documento
//!
//! 1. `DocumentStarted`: documento recebido.
//! 2. `SentenceEncoded` (loop): linhas de uma sentença prontas.
//! 3. `DocumentWritten` ou `DocumentFailed`: resultado final.
//!
//! Sentenças podem ser codificadas em paralelo (rayon); a escrita é sempre
//! sequencial e na ordem do documento. Se uma sentença falhar, as anteriores
//! já estão no arquivo e continuam lá.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ConllConfig;
use crate::document::{Document, Sentence};
use crate::error::{ConllError, Result};
use crate::row::{Row, RowBuilder};
use crate::writer::{TableWriter, WriterConfig};

/// Eventos emitidos pelo pipeline durante a conversão.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    DocumentStarted {
        document: String,
        sentences: usize,
    },
    /// Uma sentença foi convertida em linhas (ainda não escrita).
    SentenceEncoded {
        document: String,
        sentence: usize,
        tokens: usize,
    },
    DocumentWritten {
        document: String,
        path: Option<PathBuf>,
        sentences: usize,
        rows: usize,
        processing_ms: u64,
    },
    /// **Falha**: o documento parou no primeiro erro; o que já foi escrito fica.
    DocumentFailed {
        document: String,
        message: String,
    },
}

/// Resumo de um documento convertido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub path: Option<PathBuf>,
    pub sentences: usize,
    pub rows: usize,
    pub processing_ms: u64,
}

/// O pipeline de conversão.
///
/// # Modos de Uso
/// - **Sync**: [`ConllPipeline::convert_all`] e [`ConllPipeline::write_document_to`].
/// - **Streaming**: [`ConllPipeline::convert_streaming`], que empurra
///   [`PipelineEvent`]s por um canal.
pub struct ConllPipeline {
    config: WriterConfig,
    builder: RowBuilder,
    parallel: bool,
}

impl ConllPipeline {
    /// Valida a configuração e monta o pipeline.
    pub fn new(config: &ConllConfig) -> Result<Self> {
        let mut pipeline = Self::from_writer_config(config.resolve()?);
        pipeline.parallel = config.parallel;
        Ok(pipeline)
    }

    pub fn from_writer_config(config: WriterConfig) -> Self {
        let builder = RowBuilder::new(&config.columns, config.missing_attribute, config.absent_layer);
        Self {
            config,
            builder,
            parallel: false,
        }
    }

    /// Liga ou desliga o processamento paralelo.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Codifica todas as sentenças, na ordem do documento.
    ///
    /// Cada posição traz o resultado da sua sentença; quem escreve para no
    /// primeiro erro.
    pub fn encode_document<'a>(&self, document: &'a Document) -> Vec<Result<Vec<Row<'a>>>> {
        let encode = |(i, sentence): (usize, &'a Sentence)| self.builder.build(&document.id, i, sentence);
        if self.parallel {
            document.sentences.par_iter().enumerate().map(encode).collect()
        } else {
            document.sentences.iter().enumerate().map(encode).collect()
        }
    }

    /// Escreve o documento em qualquer destino e devolve o destino.
    ///
    /// O escritor é finalizado (buffer descarregado) mesmo quando uma sentença
    /// falha, para que as linhas anteriores cheguem ao destino.
    pub fn write_document_to<W: Write>(&self, document: &Document, sink: W) -> Result<(W, DocumentReport)> {
        let (tx, _rx) = mpsc::channel();
        self.write_streaming(document, sink, None, &tx)
    }

    /// Escreve o documento em `<dir>/<nome base><sufixo>`, criando o diretório.
    pub fn write_to_dir(&self, document: &Document, dir: &Path) -> Result<DocumentReport> {
        let (tx, _rx) = mpsc::channel();
        self.write_to_dir_streaming(document, dir, &tx)
    }

    /// Converte vários documentos, emitindo eventos pelo canal `tx`.
    ///
    /// Um documento com erro não interrompe os demais. Os resultados vêm na
    /// ordem de entrada.
    ///
    /// Cada arquivo de saída pertence a um único documento: quando dois
    /// documentos têm o mesmo nome base, o primeiro na ordem de entrada é
    /// escrito e os seguintes falham com [`ConllError::DuplicateOutput`], sem
    /// tocar no arquivo.
    pub fn convert_streaming(
        &self,
        documents: &[Document],
        dir: &Path,
        tx: mpsc::Sender<PipelineEvent>,
    ) -> Vec<Result<DocumentReport>> {
        info!(documents = documents.len(), dir = %dir.display(), parallel = self.parallel, "convertendo documentos");
        let owners = self.output_owners(documents, dir);

        let convert = |tx: &mpsc::Sender<PipelineEvent>, (document, owner): (&Document, &Option<String>)| match owner {
            Some(first) => Err(fail(
                tx,
                document,
                ConllError::DuplicateOutput {
                    document: document.id.clone(),
                    path: self.config.output_path(dir, document),
                    first: first.clone(),
                },
            )),
            None => self.write_to_dir_streaming(document, dir, tx),
        };

        if self.parallel {
            documents
                .par_iter()
                .zip(owners.par_iter())
                .map_with(tx, |tx, pair| convert(&*tx, pair))
                .collect()
        } else {
            documents.iter().zip(owners.iter()).map(|pair| convert(&tx, pair)).collect()
        }
    }

    /// Para cada documento, o id do documento anterior que já reservou o
    /// mesmo arquivo de saída (`None` quando o arquivo é dele).
    fn output_owners(&self, documents: &[Document], dir: &Path) -> Vec<Option<String>> {
        let mut claimed: HashMap<PathBuf, &str> = HashMap::with_capacity(documents.len());
        documents
            .iter()
            .map(|document| match claimed.entry(self.config.output_path(dir, document)) {
                Entry::Occupied(entry) => Some(entry.get().to_string()),
                Entry::Vacant(entry) => {
                    entry.insert(&document.id);
                    None
                }
            })
            .collect()
    }

    /// Converte vários documentos de forma síncrona.
    pub fn convert_all(&self, documents: &[Document], dir: &Path) -> Vec<Result<DocumentReport>> {
        let (tx, _rx) = mpsc::channel();
        self.convert_streaming(documents, dir, tx)
    }

    fn write_to_dir_streaming(
        &self,
        document: &Document,
        dir: &Path,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> Result<DocumentReport> {
        let path = self.config.output_path(dir, document);
        let opened = fs::create_dir_all(dir).and_then(|_| File::create(&path));
        let file = match opened {
            Ok(file) => file,
            Err(source) => return Err(fail(tx, document, ConllError::io(&document.id, source))),
        };
        debug!(document = %document.id, path = %path.display(), "arquivo de saída criado");

        let (_, report) = self.write_streaming(document, file, Some(path), tx)?;
        Ok(report)
    }

    fn write_streaming<W: Write>(
        &self,
        document: &Document,
        sink: W,
        path: Option<PathBuf>,
        tx: &mpsc::Sender<PipelineEvent>,
    ) -> Result<(W, DocumentReport)> {
        let start = Instant::now();
        let _ = tx.send(PipelineEvent::DocumentStarted {
            document: document.id.clone(),
            sentences: document.len(),
        });

        let mut writer = TableWriter::new(sink, &self.config);
        let mut outcome = Ok(());
        for (i, encoded) in self.encode_document(document).into_iter().enumerate() {
            let rows = match encoded {
                Ok(rows) => rows,
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            };
            let _ = tx.send(PipelineEvent::SentenceEncoded {
                document: document.id.clone(),
                sentence: i,
                tokens: rows.len(),
            });
            if let Err(source) = writer.write_sentence(&rows) {
                outcome = Err(ConllError::io(&document.id, source));
                break;
            }
        }

        let sentences = writer.sentences_written();
        let rows = writer.rows_written();
        // finish roda em todos os caminhos: sucesso ou erro
        let finished = writer.finish();

        if let Err(e) = outcome {
            return Err(fail(tx, document, e));
        }
        let sink = match finished {
            Ok(sink) => sink,
            Err(source) => return Err(fail(tx, document, ConllError::io(&document.id, source))),
        };

        let report = DocumentReport {
            document: document.id.clone(),
            path,
            sentences,
            rows,
            processing_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            document = %report.document,
            sentences = report.sentences,
            rows = report.rows,
            ms = report.processing_ms,
            "documento escrito"
        );
        let _ = tx.send(PipelineEvent::DocumentWritten {
            document: report.document.clone(),
            path: report.path.clone(),
            sentences: report.sentences,
            rows: report.rows,
            processing_ms: report.processing_ms,
        });
        Ok((sink, report))
    }
}

impl Default for ConllPipeline {
    fn default() -> Self {
        Self::from_writer_config(WriterConfig::default())
    }
}

fn fail(tx: &mpsc::Sender<PipelineEvent>, document: &Document, error: ConllError) -> ConllError {
    warn!(document = %document.id, error = %error, "falha na conversão");
    let _ = tx.send(PipelineEvent::DocumentFailed {
        document: document.id.clone(),
        message: error.to_string(),
    });
    error
}
