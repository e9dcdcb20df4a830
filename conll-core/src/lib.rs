//! # conll-core — Escrita de Tabelas CoNLL a partir de Spans
//!
//! Este crate converte documentos já anotados (tokens com lema e POS, mais
//! spans tipados por camada) em tabelas no estilo CoNLL: uma linha por token,
//! uma coluna por atributo, uma coluna BIO por camada e uma linha em branco
//! depois de cada sentença.
//!
//! ## Arquitetura
//!
//! O dado flui em um pipeline linear, sem estado global:
//!
//! 1.  **Entrada**: [`Document`] com [`Sentence`]s, tokens e spans por [`Layer`].
//! 2.  **Índice** ([`span`]): cada camada vira um [`SpanIndex`] token → span, validando sobreposições.
//! 3.  **Codificação** ([`iob`]): o [`IobEncoder`] atribui `B-x`, `I-x` ou `O` a cada token.
//! 4.  **Linhas** ([`row`]): o [`RowBuilder`] junta atributos e rótulos de todas as camadas.
//! 5.  **Saída** ([`writer`]): o [`TableWriter`] escreve as linhas na codificação configurada.
//!
//! O [`pipeline`] orquestra os passos por documento e emite eventos de progresso.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use conll_core::{ConllPipeline, Document, Layer, Sentence, Span, Token};
//!
//! let sentence = Sentence::new(vec![
//!     Token::new("Pierre").with_pos("NNP"),
//!     Token::new("Vinken").with_pos("NNP"),
//!     Token::new(",").with_pos(","),
//! ])
//! .with_spans(Layer::NamedEntity, vec![Span::new("person", 0, 1)]);
//! let document = Document::new("document.txt").with_sentence(sentence);
//!
//! let pipeline = ConllPipeline::default();
//! let (bytes, _report) = pipeline.write_document_to(&document, Vec::new()).unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(bytes).unwrap(),
//!     "1 Pierre Pierre NNP B-person\n2 Vinken Vinken NNP I-person\n3 , , , O\n\n"
//! );
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta todos os estágios.
//! - [`config`]: configuração TOML e sua validação.
//! - [`reader`]: leitura de tabelas escritas, de volta para spans.
//! - [`corpus`]: documento de exemplo anotado.

pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod iob;
pub mod pipeline;
pub mod reader;
pub mod row;
pub mod span;
pub mod token;
pub mod writer;

pub use config::ConllConfig;
pub use document::{Document, Layer, Sentence};
pub use error::{ConllError, Result};
pub use iob::{IobEncoder, Tag};
pub use pipeline::{ConllPipeline, DocumentReport, PipelineEvent};
pub use reader::{BioViolation, ParsedRow, ParsedSentence, TableReader};
pub use row::{MissingAttributePolicy, Row, RowBuilder};
pub use span::{decode_spans, Span, SpanError, SpanIndex};
pub use token::{Token, TokenTable};
pub use writer::{AbsentLayerPolicy, Column, Layout, TableWriter, WriterConfig};
