//! # Spans e Índice de Spans
//!
//! Um span é um intervalo tipado de tokens dentro de uma sentença, como uma
//! menção de entidade ("Pierre Vinken" → `person`) ou um chunk sintático
//! ("the board" → `NP`).
//!
//! O [`SpanIndex`] transforma a lista de spans de **uma camada** em um mapa
//! token → span, validando o invariante de não-sobreposição. Depois da
//! construção (O(n)), a consulta `covering_span(i)` é O(1).
//!
//! ## Exemplo
//! ```rust
//! use conll_core::span::{Span, SpanIndex};
//!
//! let spans = vec![Span::new("person", 0, 1)];
//! let index = SpanIndex::build(&spans, 6).unwrap();
//!
//! assert_eq!(index.covering_span(1).map(|s| s.label.as_str()), Some("person"));
//! assert!(index.covering_span(2).is_none());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::iob::Tag;

/// Um intervalo de tokens com um rótulo de tipo.
///
/// Os índices são **inclusivos** nas duas pontas: em "Pierre Vinken , 61",
/// o span de "Pierre Vinken" é `Span { label: "person", start: 0, end: 1 }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Tipo do span (ex: "person", "organization", "NP").
    pub label: String,
    /// Índice do primeiro token (inclusivo).
    pub start: usize,
    /// Índice do último token (inclusivo).
    pub end: usize,
}

impl Span {
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// Número de tokens cobertos.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn contains(&self, token: usize) -> bool {
        self.start <= token && token <= self.end
    }
}

/// Violação do contrato de entrada de uma camada.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("span `{label}` [{start}, {end}] começa depois de terminar")]
    Inverted {
        label: String,
        start: usize,
        end: usize,
    },

    #[error("span [{start}, {end}] sem rótulo")]
    EmptyLabel { start: usize, end: usize },

    #[error("span `{label}` [{start}, {end}] excede a sentença de {len} tokens")]
    OutOfRange {
        label: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("spans `{first}` e `{second}` se sobrepõem no token {token}")]
    Overlap {
        first: String,
        second: String,
        token: usize,
    },
}

/// Papel de um token em relação aos spans de uma camada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanPosition {
    /// Primeiro token de um span.
    Start,
    /// Coberto por um span, mas não é o primeiro.
    Inside,
    /// Fora de qualquer span.
    Outside,
}

/// Mapa token → span de uma camada, para uma sentença.
///
/// Guarda, por token, o **ordinal** do span que o cobre. O ordinal serve de
/// identidade da instância: dois spans adjacentes do mesmo tipo têm ordinais
/// diferentes, e é isso que permite ao [`IobEncoder`](crate::iob::IobEncoder)
/// emitir um novo `B-` em vez de fundir os dois em uma única sequência `I-`.
#[derive(Debug, Clone)]
pub struct SpanIndex<'a> {
    spans: &'a [Span],
    covering: Vec<Option<usize>>,
}

impl<'a> SpanIndex<'a> {
    /// Constrói o índice validando limites e não-sobreposição.
    ///
    /// Cada token é marcado no máximo uma vez; a primeira colisão interrompe a
    /// construção. O custo total é O(n + número de spans).
    pub fn build(spans: &'a [Span], sentence_len: usize) -> Result<Self, SpanError> {
        let mut covering = vec![None; sentence_len];

        for (ordinal, span) in spans.iter().enumerate() {
            if span.label.trim().is_empty() {
                return Err(SpanError::EmptyLabel {
                    start: span.start,
                    end: span.end,
                });
            }
            if span.start > span.end {
                return Err(SpanError::Inverted {
                    label: span.label.clone(),
                    start: span.start,
                    end: span.end,
                });
            }
            if span.end >= sentence_len {
                return Err(SpanError::OutOfRange {
                    label: span.label.clone(),
                    start: span.start,
                    end: span.end,
                    len: sentence_len,
                });
            }

            for token in span.start..=span.end {
                if let Some(other) = covering[token] {
                    let first: &Span = &spans[other];
                    return Err(SpanError::Overlap {
                        first: first.label.clone(),
                        second: span.label.clone(),
                        token,
                    });
                }
                covering[token] = Some(ordinal);
            }
        }

        Ok(Self { spans, covering })
    }

    /// Índice sem spans: todos os tokens ficam fora.
    pub fn empty(sentence_len: usize) -> SpanIndex<'static> {
        SpanIndex {
            spans: &[],
            covering: vec![None; sentence_len],
        }
    }

    /// Número de tokens da sentença indexada.
    pub fn len(&self) -> usize {
        self.covering.len()
    }

    pub fn is_empty(&self) -> bool {
        self.covering.is_empty()
    }

    pub fn spans(&self) -> &'a [Span] {
        self.spans
    }

    /// Span que cobre o token, se houver.
    pub fn covering_span(&self, token: usize) -> Option<&'a Span> {
        self.covering(token).map(|(_, span)| span)
    }

    /// Ordinal e span que cobrem o token.
    pub fn covering(&self, token: usize) -> Option<(usize, &'a Span)> {
        let ordinal = self.covering.get(token).copied().flatten()?;
        self.spans.get(ordinal).map(|span| (ordinal, span))
    }

    pub fn position(&self, token: usize) -> SpanPosition {
        match self.covering_span(token) {
            Some(span) if span.start == token => SpanPosition::Start,
            Some(_) => SpanPosition::Inside,
            None => SpanPosition::Outside,
        }
    }
}

/// Reconstrói spans a partir de rótulos BIO (operação inversa do codificador).
///
/// Segue a mesma máquina de estados tolerante usada na leitura de corpora:
/// - `B-X` sempre abre um novo span.
/// - `I-X` continua o span aberto se ele for do tipo X; caso contrário, abre um novo.
/// - `O` (ou qualquer rótulo inválido) fecha o span aberto.
///
/// # Exemplo
/// `[B-person, I-person, O, B-NP]` → `[person [0,1], NP [3,3]]`
pub fn decode_spans<S: AsRef<str>>(labels: &[S]) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, &str)> = None;

    for (i, label) in labels.iter().enumerate() {
        match Tag::from_label(label.as_ref()) {
            Some(Tag::Begin(kind)) => {
                close_span(&mut spans, open.take(), i);
                open = Some((i, kind));
            }
            Some(Tag::Inside(kind)) => match open {
                Some((_, current)) if current == kind => {}
                // I- sem B- correspondente: trata como início
                _ => {
                    close_span(&mut spans, open.take(), i);
                    open = Some((i, kind));
                }
            },
            _ => close_span(&mut spans, open.take(), i),
        }
    }

    close_span(&mut spans, open.take(), labels.len());
    spans
}

fn close_span(spans: &mut Vec<Span>, open: Option<(usize, &str)>, next: usize) {
    if let Some((start, label)) = open {
        spans.push(Span::new(label, start, next - 1));
    }
}
