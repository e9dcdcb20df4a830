//! # Documento, Sentenças e Camadas
//!
//! Estrutura tipada que substitui o índice genérico de anotações dos
//! frameworks de pipeline: um [`Document`] é uma arena de [`Sentence`]s
//! acessadas por índice, e cada sentença possui seus tokens e um pequeno mapa
//! [`Layer`] → spans.
//!
//! Estágios de anotação são funções puras: [`Document::with_layer`] recebe um
//! documento e devolve outro com a camada acrescentada, sem estado global.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConllError, Result};
use crate::span::{Span, SpanIndex};
use crate::token::{Token, TokenTable};

/// Categoria de anotação por spans, codificada de forma independente das demais.
///
/// Serializada pelo nome: `"named_entity"`, `"chunk"` ou qualquer outro nome
/// para camadas próprias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Layer {
    /// Menções de entidades nomeadas (person, organization, location...).
    NamedEntity,
    /// Chunks sintáticos (NP, VP, PP...).
    Chunk,
    /// Qualquer outra camada, identificada pelo nome.
    Custom(String),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Layer::NamedEntity => "named_entity",
            Layer::Chunk => "chunk",
            Layer::Custom(name) => name,
        }
    }
}

impl From<&str> for Layer {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "named_entity" | "named-entity" | "ne" | "ner" | "entity" => Layer::NamedEntity,
            "chunk" | "chunks" => Layer::Chunk,
            _ => Layer::Custom(name.trim().to_string()),
        }
    }
}

impl From<String> for Layer {
    fn from(name: String) -> Self {
        Layer::from(name.as_str())
    }
}

impl From<Layer> for String {
    fn from(layer: Layer) -> Self {
        layer.name().to_string()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Uma sentença: tokens em ordem e spans por camada.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub spans: HashMap<Layer, Vec<Span>>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            spans: HashMap::new(),
        }
    }

    /// Sentença a partir de textos simples, sem lema nem POS.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(words.into_iter().map(Token::new).collect())
    }

    /// Acrescenta (ou substitui) os spans de uma camada.
    pub fn with_spans(mut self, layer: Layer, spans: Vec<Span>) -> Self {
        self.spans.insert(layer, spans);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn table(&self) -> TokenTable<'_> {
        TokenTable::new(&self.tokens)
    }

    /// Spans da camada; `None` quando a camada nunca foi anotada nesta sentença.
    pub fn spans(&self, layer: &Layer) -> Option<&[Span]> {
        self.spans.get(layer).map(Vec::as_slice)
    }

    /// Camadas presentes, em ordem estável.
    pub fn layers(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.spans.keys().collect();
        layers.sort();
        layers
    }
}

/// Um documento: identificador de origem e sentenças em ordem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Nome de origem (ex: "document.txt"); define o nome do arquivo de saída.
    pub id: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

/// Um arquivo JSON pode trazer um documento ou uma lista deles.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Document),
    Many(Vec<Document>),
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sentences: Vec::new(),
        }
    }

    pub fn with_sentence(mut self, sentence: Sentence) -> Self {
        self.sentences.push(sentence);
        self
    }

    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }

    /// Nome base usado para o arquivo de saída: o último componente do `id`.
    pub fn base_name(&self) -> &str {
        let name = Path::new(&self.id)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.id);
        if name.is_empty() {
            "document"
        } else {
            name
        }
    }

    /// Estágio puro: devolve o documento com uma camada nova, uma lista de
    /// spans por sentença.
    ///
    /// Os spans são validados aqui mesmo, para que um produtor defeituoso seja
    /// apontado no momento em que anexa a camada.
    pub fn with_layer(mut self, layer: Layer, spans: Vec<Vec<Span>>) -> Result<Self> {
        if spans.len() != self.sentences.len() {
            return Err(ConllError::LayerMismatch {
                document: self.id.clone(),
                layer: layer.to_string(),
                expected: self.sentences.len(),
                found: spans.len(),
            });
        }

        for (i, (sentence, sentence_spans)) in self.sentences.iter_mut().zip(spans).enumerate() {
            if let Err(source) = SpanIndex::build(&sentence_spans, sentence.len()) {
                return Err(ConllError::MalformedSpanInput {
                    document: self.id.clone(),
                    sentence: i,
                    layer: layer.to_string(),
                    source,
                });
            }
            sentence.spans.insert(layer.clone(), sentence_spans);
        }

        Ok(self)
    }

    /// Lê um ou mais documentos de um texto JSON.
    pub fn from_json_str(json: &str) -> Result<Vec<Document>> {
        Ok(match serde_json::from_str::<OneOrMany>(json)? {
            OneOrMany::One(document) => vec![document],
            OneOrMany::Many(documents) => documents,
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
