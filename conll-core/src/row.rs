//! # Linhas da Tabela
//!
//! O [`RowBuilder`] junta, token a token, os atributos da [`TokenTable`] com os
//! rótulos de cada [`IobEncoder`] configurado, produzindo uma [`Row`] por token.
//!
//! ## Política de atributos ausentes
//!
//! Existe **uma** política, aplicada aqui e em nenhum outro lugar
//! ([`MissingAttributePolicy`]):
//!
//! | Política      | Lema ausente              | POS ausente  |
//! |---------------|---------------------------|--------------|
//! | `Fallback`    | forma de superfície       | placeholder  |
//! | `Placeholder` | placeholder               | placeholder  |
//! | `Fail`        | erro                      | erro         |
//!
//! Atributos só são exigidos quando a coluna correspondente está configurada.

use serde::{Deserialize, Serialize};

use crate::document::{Layer, Sentence};
use crate::error::{ConllError, Result};
use crate::iob::{IobEncoder, Tag};
use crate::span::SpanIndex;
use crate::token::Token;
use crate::writer::{AbsentLayerPolicy, Column};

/// O que fazer quando uma coluna configurada não tem valor para um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttributePolicy {
    /// Lema cai para o texto do token; demais atributos viram placeholder.
    #[default]
    Fallback,
    /// Todo atributo ausente vira placeholder.
    Placeholder,
    /// Atributo ausente é erro ([`ConllError::MissingRequiredAttribute`]).
    Fail,
}

/// Visão de um token pronta para escrita.
///
/// Empresta o token da sentença de origem e não vive mais do que ela.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    /// Posição na sentença, base 1.
    pub id: usize,
    pub token: &'a Token,
    /// Lema resolvido pela política; `None` vira placeholder na escrita.
    pub lemma: Option<&'a str>,
    pub pos: Option<&'a str>,
    /// Um rótulo por camada configurada, na ordem das colunas.
    /// `None` indica camada ausente na sentença (ver [`AbsentLayerPolicy`]).
    pub labels: Vec<Option<Tag<'a>>>,
}

impl<'a> Row<'a> {
    pub fn text(&self) -> &'a str {
        &self.token.text
    }

    /// Rótulo da `k`-ésima camada configurada.
    pub fn label(&self, k: usize) -> Option<Tag<'a>> {
        self.labels.get(k).copied().flatten()
    }
}

/// Monta as linhas de uma sentença para um conjunto de colunas.
#[derive(Debug, Clone)]
pub struct RowBuilder {
    layers: Vec<Layer>,
    needs_lemma: bool,
    needs_pos: bool,
    policy: MissingAttributePolicy,
    absent: AbsentLayerPolicy,
}

impl RowBuilder {
    pub fn new(columns: &[Column], policy: MissingAttributePolicy, absent: AbsentLayerPolicy) -> Self {
        Self {
            layers: columns
                .iter()
                .filter_map(|c| match c {
                    Column::Layer(layer) => Some(layer.clone()),
                    _ => None,
                })
                .collect(),
            needs_lemma: columns.contains(&Column::Lemma),
            needs_pos: columns.contains(&Column::Pos),
            policy,
            absent,
        }
    }

    /// Camadas codificadas, na ordem das colunas.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Constrói uma linha por token, na ordem dos tokens.
    ///
    /// Cada camada recebe seu próprio [`SpanIndex`] e seu próprio
    /// [`IobEncoder`]; camadas desligadas na configuração nem chegam a ser
    /// codificadas.
    pub fn build<'a>(&self, document: &str, sentence_index: usize, sentence: &'a Sentence) -> Result<Vec<Row<'a>>> {
        let table = sentence.table();
        let len = table.len();

        let mut layer_tags: Vec<Option<Vec<Tag<'a>>>> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let tags = match sentence.spans(layer) {
                Some(spans) => {
                    let index = SpanIndex::build(spans, len).map_err(|source| ConllError::MalformedSpanInput {
                        document: document.to_string(),
                        sentence: sentence_index,
                        layer: layer.to_string(),
                        source,
                    })?;
                    Some(IobEncoder::new(&index).encode_all())
                }
                None => match self.absent {
                    AbsentLayerPolicy::Outside => Some(vec![Tag::Outside; len]),
                    AbsentLayerPolicy::Placeholder | AbsentLayerPolicy::Omit => None,
                },
            };
            layer_tags.push(tags);
        }

        table
            .iter()
            .enumerate()
            .map(|(i, token)| {
                let missing = |column: &str| ConllError::MissingRequiredAttribute {
                    document: document.to_string(),
                    sentence: sentence_index,
                    token: i,
                    column: column.to_string(),
                };

                let lemma = match (token.lemma.as_deref(), self.policy) {
                    (Some(lemma), _) => Some(lemma),
                    (None, MissingAttributePolicy::Fallback) => Some(token.text.as_str()),
                    (None, MissingAttributePolicy::Fail) if self.needs_lemma => return Err(missing("lemma")),
                    (None, _) => None,
                };
                let pos = match (token.pos.as_deref(), self.policy) {
                    (None, MissingAttributePolicy::Fail) if self.needs_pos => return Err(missing("pos")),
                    (pos, _) => pos,
                };

                Ok(Row {
                    id: i + 1,
                    token,
                    lemma,
                    pos,
                    labels: layer_tags
                        .iter()
                        .map(|tags| tags.as_ref().and_then(|t| t.get(i).copied()))
                        .collect(),
                })
            })
            .collect()
    }
}
