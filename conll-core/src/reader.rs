//! # Leitura de Tabelas CoNLL
//!
//! Operação inversa do [`TableWriter`](crate::writer::TableWriter): lê um
//! arquivo escrito com uma configuração de colunas conhecida e reconstrói as
//! linhas, agrupadas por sentença. Com [`decode_spans`] as colunas BIO voltam a
//! ser spans, e a tabela inteira volta a ser um [`Document`].
//!
//! Usado pelo comando `check` da linha de comando e pelos testes de ida e volta.

use std::borrow::Cow;

use serde::Serialize;

use crate::document::{Document, Layer, Sentence};
use crate::error::{ConllError, Result};
use crate::iob::Tag;
use crate::span::decode_spans;
use crate::token::Token;
use crate::writer::{AbsentLayerPolicy, Column, WriterConfig};

/// Uma linha lida, já separada por coluna.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRow {
    /// Número da linha no arquivo (base 1).
    pub line: usize,
    pub index: Option<usize>,
    pub text: String,
    pub lemma: Option<String>,
    pub pos: Option<String>,
    /// Um rótulo por camada configurada; `None` para placeholder ou coluna omitida.
    pub labels: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedSentence {
    pub rows: Vec<ParsedRow>,
}

/// Transição BIO inválida encontrada em uma tabela (ex: `O` seguido de `I-NP`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BioViolation {
    pub sentence: usize,
    pub line: usize,
    pub layer: String,
    pub previous: String,
    pub label: String,
}

/// Leitor de tabelas para uma configuração de colunas.
#[derive(Debug, Clone, Copy)]
pub struct TableReader<'c> {
    config: &'c WriterConfig,
}

impl<'c> TableReader<'c> {
    pub fn new(config: &'c WriterConfig) -> Self {
        Self { config }
    }

    /// Decodifica os bytes do arquivo na codificação configurada.
    pub fn decode<'b>(&self, bytes: &'b [u8]) -> Cow<'b, str> {
        let (text, _, _) = self.config.encoding.decode(bytes);
        text
    }

    /// Separa o texto em sentenças e linhas.
    ///
    /// Cada linha em branco fecha uma sentença (linhas em branco seguidas são
    /// sentenças vazias). Linhas finais sem a linha em branco de fechamento
    /// ainda formam uma sentença.
    pub fn parse_str(&self, input: &str) -> Result<Vec<ParsedSentence>> {
        let mut sentences = Vec::new();
        let mut current = ParsedSentence::default();

        for (i, line) in input.lines().enumerate() {
            if line.trim().is_empty() {
                sentences.push(std::mem::take(&mut current));
                continue;
            }
            let row = self.parse_line(i + 1, line, current.rows.len())?;
            current.rows.push(row);
        }

        if !current.rows.is_empty() {
            sentences.push(current);
        }
        Ok(sentences)
    }

    /// Lê a tabela e reconstrói o documento, com uma camada por coluna BIO.
    ///
    /// Uma camada só é recriada na sentença se ao menos um token tiver rótulo
    /// para ela.
    pub fn read_document(&self, id: &str, input: &str) -> Result<Document> {
        let layers: Vec<&Layer> = self.config.layers().collect();
        let mut document = Document::new(id);

        for parsed in self.parse_str(input)? {
            let tokens = parsed
                .rows
                .iter()
                .map(|row| Token {
                    text: row.text.clone(),
                    lemma: row.lemma.clone(),
                    pos: row.pos.clone(),
                })
                .collect();
            let mut sentence = Sentence::new(tokens);

            for (k, layer) in layers.iter().enumerate() {
                let labels: Vec<&str> = parsed
                    .rows
                    .iter()
                    .map(|row| row.labels.get(k).and_then(|l| l.as_deref()).unwrap_or("O"))
                    .collect();
                let annotated = parsed
                    .rows
                    .iter()
                    .any(|row| matches!(row.labels.get(k), Some(Some(_))));
                if annotated {
                    sentence.spans.insert((*layer).clone(), decode_spans(&labels));
                }
            }

            document.sentences.push(sentence);
        }

        Ok(document)
    }

    /// Lista as transições BIO inválidas de todas as camadas.
    pub fn bio_violations(&self, sentences: &[ParsedSentence]) -> Vec<BioViolation> {
        let layers: Vec<&Layer> = self.config.layers().collect();
        let mut violations = Vec::new();

        for (s, sentence) in sentences.iter().enumerate() {
            for (k, layer) in layers.iter().enumerate() {
                let mut previous = Tag::Outside;
                let mut previous_label = "O";
                for row in &sentence.rows {
                    let label = row.labels.get(k).and_then(|l| l.as_deref()).unwrap_or("O");
                    let tag = Tag::from_label(label).unwrap_or(Tag::Outside);
                    if !Tag::is_valid_transition(&previous, &tag) {
                        violations.push(BioViolation {
                            sentence: s,
                            line: row.line,
                            layer: layer.to_string(),
                            previous: previous_label.to_string(),
                            label: label.to_string(),
                        });
                    }
                    previous = tag;
                    previous_label = label;
                }
            }
        }

        violations
    }

    fn parse_line(&self, line_no: usize, line: &str, position: usize) -> Result<ParsedRow> {
        let fields: Vec<&str> = line.split(' ').collect();
        let columns = &self.config.columns;
        let layer_count = self.config.layers().count();

        let omitted = columns.len().saturating_sub(fields.len());
        let acceptable = fields.len() == columns.len()
            || (self.config.absent_layer == AbsentLayerPolicy::Omit
                && fields.len() < columns.len()
                && omitted <= layer_count
                && columns[fields.len()..].iter().all(|c| matches!(c, Column::Layer(_))));
        if !acceptable {
            return Err(ConllError::Parse {
                line: line_no,
                message: format!("{} campos, esperado {}", fields.len(), columns.len()),
            });
        }

        let placeholder = self.config.placeholder.as_str();
        let optional = |value: &str| (value != placeholder).then(|| value.to_string());

        let mut row = ParsedRow {
            line: line_no,
            index: None,
            text: String::new(),
            lemma: None,
            pos: None,
            labels: Vec::with_capacity(layer_count),
        };

        for (k, column) in columns.iter().enumerate() {
            let Some(&value) = fields.get(k) else {
                row.labels.push(None);
                continue;
            };
            match column {
                Column::Index => {
                    let index: usize = value.parse().map_err(|_| ConllError::Parse {
                        line: line_no,
                        message: format!("índice inválido `{value}`"),
                    })?;
                    if index != position + 1 {
                        return Err(ConllError::Parse {
                            line: line_no,
                            message: format!("índice {index} fora de ordem, esperado {}", position + 1),
                        });
                    }
                    row.index = Some(index);
                }
                Column::Text => row.text = value.to_string(),
                Column::Lemma => row.lemma = optional(value),
                Column::Pos => row.pos = optional(value),
                Column::Layer(layer) => {
                    if value != placeholder && Tag::from_label(value).is_none() {
                        return Err(ConllError::Parse {
                            line: line_no,
                            message: format!("rótulo BIO inválido `{value}` na camada `{layer}`"),
                        });
                    }
                    row.labels.push(optional(value));
                }
            }
        }

        Ok(row)
    }
}
