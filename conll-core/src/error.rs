//! # Erros da Conversão
//!
//! Todos os erros carregam contexto suficiente (documento, sentença, camada)
//! para localizar a entrada problemática. Nenhum deles é silenciado pelo núcleo.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::span::SpanError;

/// Erro de alto nível produzido pela conversão de um documento.
#[derive(Debug, Error)]
pub enum ConllError {
    /// Spans de uma camada se sobrepõem ou apontam para fora da sentença.
    #[error("spans malformados em `{document}`, sentença {sentence}, camada `{layer}`: {source}")]
    MalformedSpanInput {
        document: String,
        sentence: usize,
        layer: String,
        #[source]
        source: SpanError,
    },

    /// Uma coluna configurada não tem valor para o token
    /// (apenas com [`MissingAttributePolicy::Fail`](crate::row::MissingAttributePolicy::Fail)).
    #[error("atributo `{column}` ausente em `{document}`, sentença {sentence}, token {token}")]
    MissingRequiredAttribute {
        document: String,
        sentence: usize,
        token: usize,
        column: String,
    },

    /// Uma camada foi anexada com um número de sentenças diferente do documento.
    #[error("camada `{layer}` de `{document}` tem {found} sentenças, esperado {expected}")]
    LayerMismatch {
        document: String,
        layer: String,
        expected: usize,
        found: usize,
    },

    /// Falha ao abrir ou escrever na saída do documento.
    #[error("falha de E/S em `{document}`: {source}")]
    Io {
        document: String,
        #[source]
        source: io::Error,
    },

    /// Dois documentos do mesmo lote teriam o mesmo arquivo de saída.
    #[error("saída {} de `{document}` já pertence a `{first}`", .path.display())]
    DuplicateOutput {
        document: String,
        path: PathBuf,
        first: String,
    },

    #[error("configuração inválida: {0}")]
    Config(String),

    #[error("codificação desconhecida: `{0}`")]
    UnknownEncoding(String),

    /// Linha inválida ao ler uma tabela CoNLL.
    #[error("linha {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConllError {
    /// Atalho para embrulhar um `io::Error` com o identificador do documento.
    pub fn io(document: impl Into<String>, source: io::Error) -> Self {
        ConllError::Io {
            document: document.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConllError>;
