//! # Corpus de Exemplo
//!
//! As duas primeiras sentenças do Penn Treebank (WSJ 0001), anotadas com lema,
//! POS, entidades nomeadas e chunks. Servem de demonstração para o comando
//! `sample` e de cenário fixo nos testes.
//!
//! | Camada         | Spans da primeira sentença                                   |
//! |----------------|--------------------------------------------------------------|
//! | `named_entity` | `person` [0,1]                                               |
//! | `chunk`        | NP [0,1], NP [3,4], ADJP [5,5], VP [7,8], NP [9,10], PP [11,11], NP [12,14], NP [15,16] |

use crate::document::{Document, Layer, Sentence};
use crate::span::Span;
use crate::token::Token;

/// Nome do documento de exemplo.
pub const SAMPLE_ID: &str = "pierre_vinken.txt";

/// Tripla (texto, lema, POS) de um token anotado.
type Entry = (&'static str, &'static str, &'static str);

const FIRST: &[Entry] = &[
    ("Pierre", "Pierre", "NNP"),
    ("Vinken", "Vinken", "NNP"),
    (",", ",", ","),
    ("61", "61", "CD"),
    ("years", "year", "NNS"),
    ("old", "old", "JJ"),
    (",", ",", ","),
    ("will", "will", "MD"),
    ("join", "join", "VB"),
    ("the", "the", "DT"),
    ("board", "board", "NN"),
    ("as", "as", "IN"),
    ("a", "a", "DT"),
    ("nonexecutive", "nonexecutive", "JJ"),
    ("director", "director", "NN"),
    ("Nov.", "Nov.", "NNP"),
    ("29", "29", "CD"),
    (".", ".", "."),
];

const SECOND: &[Entry] = &[
    ("Mr.", "Mr.", "NNP"),
    ("Vinken", "Vinken", "NNP"),
    ("is", "be", "VBZ"),
    ("chairman", "chairman", "NN"),
    ("of", "of", "IN"),
    ("Elsevier", "Elsevier", "NNP"),
    ("N.V.", "N.V.", "NNP"),
    (",", ",", ","),
    ("the", "the", "DT"),
    ("Dutch", "Dutch", "NNP"),
    ("publishing", "publish", "VBG"),
    ("group", "group", "NN"),
    (".", ".", "."),
];

fn sentence(entries: &[Entry]) -> Sentence {
    Sentence::new(
        entries
            .iter()
            .map(|&(text, lemma, pos)| Token::new(text).with_lemma(lemma).with_pos(pos))
            .collect(),
    )
}

fn spans(list: &[(&str, usize, usize)]) -> Vec<Span> {
    list.iter().map(|&(label, start, end)| Span::new(label, start, end)).collect()
}

/// Retorna o documento de exemplo, com as camadas `named_entity` e `chunk`.
pub fn sample_document() -> Document {
    let first = sentence(FIRST)
        .with_spans(Layer::NamedEntity, spans(&[("person", 0, 1)]))
        .with_spans(
            Layer::Chunk,
            spans(&[
                ("NP", 0, 1),
                ("NP", 3, 4),
                ("ADJP", 5, 5),
                ("VP", 7, 8),
                ("NP", 9, 10),
                ("PP", 11, 11),
                ("NP", 12, 14),
                ("NP", 15, 16),
            ]),
        );

    let second = sentence(SECOND)
        .with_spans(
            Layer::NamedEntity,
            spans(&[("person", 1, 1), ("organization", 5, 6)]),
        )
        .with_spans(
            Layer::Chunk,
            spans(&[
                ("NP", 0, 1),
                ("VP", 2, 2),
                ("NP", 3, 3),
                ("PP", 4, 4),
                ("NP", 5, 6),
                ("NP", 8, 11),
            ]),
        );

    Document::new(SAMPLE_ID).with_sentence(first).with_sentence(second)
}
