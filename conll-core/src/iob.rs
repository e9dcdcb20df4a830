//! # Esquema BIO e Codificador IOB
//!
//! Converte os spans de uma camada em um rótulo por token:
//!
//! - `B-TIPO`: Begin, primeiro token de um span
//! - `I-TIPO`: Inside, continuação do **mesmo** span do token anterior
//! - `O`: Outside, token fora de qualquer span da camada
//!
//! ## Algoritmo
//!
//! O [`IobEncoder`] faz uma única passada da esquerda para a direita, sem
//! olhar adiante. O único estado é o span que cobriu o token anterior:
//!
//! 1. Token sem span → `O`, e o estado é esquecido.
//! 2. Token com span, e o token anterior estava no mesmo span (mesma
//!    instância e mesmo tipo) → `I-TIPO`.
//! 3. Qualquer outro caso → `B-TIPO`.
//!
//! A regra 3 garante que dois spans adjacentes do mesmo tipo
//! (`John` `Paul`, dois `person` distintos) virem `B-person B-person`, e
//! nunca `B-person I-person`.
//!
//! Camadas diferentes (entidades, chunks) usam codificadores independentes:
//! o rótulo de uma nunca influencia o de outra.

use std::fmt;

use crate::span::SpanIndex;

/// Rótulo BIO aplicado a um token.
///
/// Empresta o tipo do span de origem, então nenhum rótulo aloca até ser escrito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag<'a> {
    /// **Begin**: início de um span. Ex: **Pierre** (B-person) Vinken.
    Begin(&'a str),
    /// **Inside**: continuação de um span. Ex: Pierre **Vinken** (I-person).
    Inside(&'a str),
    /// **Outside**: fora de qualquer span da camada.
    Outside,
}

impl<'a> Tag<'a> {
    /// Representação textual (ex: "B-person", "I-NP", "O").
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Tipo do span, para `B-` e `I-`.
    pub fn kind(&self) -> Option<&'a str> {
        match self {
            Tag::Begin(kind) | Tag::Inside(kind) => Some(kind),
            Tag::Outside => None,
        }
    }

    /// Verifica se a transição `prev → next` é válida no esquema BIO.
    ///
    /// Regras:
    /// - `I-X` só pode seguir `B-X` ou `I-X` (mesmo tipo)
    /// - `B-X` e `O` podem seguir qualquer rótulo
    pub fn is_valid_transition(prev: &Tag<'_>, next: &Tag<'_>) -> bool {
        match next {
            Tag::Inside(kind) => match prev {
                Tag::Begin(prev_kind) | Tag::Inside(prev_kind) => prev_kind == kind,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Interpreta um rótulo textual (ex: "B-person" → `Begin("person")`).
    ///
    /// O tipo pode conter hífens (`B-WORK-OF-ART`); apenas o primeiro separa o prefixo.
    pub fn from_label(s: &'a str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, kind) = s.split_once('-')?;
        if kind.is_empty() {
            return None;
        }
        match prefix {
            "B" => Some(Tag::Begin(kind)),
            "I" => Some(Tag::Inside(kind)),
            _ => None,
        }
    }
}

impl fmt::Display for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Begin(kind) => write!(f, "B-{kind}"),
            Tag::Inside(kind) => write!(f, "I-{kind}"),
            Tag::Outside => f.write_str("O"),
        }
    }
}

/// Codificador BIO de uma camada em uma sentença.
///
/// `'i` é o empréstimo do índice; `'a` é o dos spans, e é ele que os
/// [`Tag`]s carregam. Os rótulos sobrevivem ao índice.
#[derive(Debug)]
pub struct IobEncoder<'i, 'a> {
    index: &'i SpanIndex<'a>,
    /// Ordinal do span que cobriu o token anterior.
    previous: Option<usize>,
    /// Próximo token esperado em uma passada sequencial.
    cursor: usize,
}

impl<'i, 'a> IobEncoder<'i, 'a> {
    pub fn new(index: &'i SpanIndex<'a>) -> Self {
        Self {
            index,
            previous: None,
            cursor: 0,
        }
    }

    /// Volta ao estado de início de sentença.
    pub fn reset(&mut self) {
        self.previous = None;
        self.cursor = 0;
    }

    /// Emite o rótulo do token `token`.
    ///
    /// Pensado para ser chamado em ordem (0, 1, 2...). Se a ordem for quebrada,
    /// o estado é refeito a partir do token imediatamente anterior, de modo que
    /// o resultado é sempre o mesmo de uma passada sequencial.
    pub fn encode(&mut self, token: usize) -> Tag<'a> {
        if token != self.cursor {
            self.previous = token
                .checked_sub(1)
                .and_then(|prev| self.index.covering(prev))
                .map(|(ordinal, _)| ordinal);
        }
        self.cursor = token + 1;

        let Some((ordinal, current)) = self.index.covering(token) else {
            self.previous = None;
            return Tag::Outside;
        };

        let continues = self
            .previous
            .and_then(|prev| self.index.spans().get(prev).map(|span| (prev, span)))
            .is_some_and(|(prev, span)| prev == ordinal && span.label == current.label);
        self.previous = Some(ordinal);

        if continues {
            Tag::Inside(&current.label)
        } else {
            Tag::Begin(&current.label)
        }
    }

    /// Codifica a sentença inteira, do primeiro ao último token.
    pub fn encode_all(mut self) -> Vec<Tag<'a>> {
        self.reset();
        (0..self.index.len()).map(|i| self.encode(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn labels(spans: &[Span], len: usize) -> Vec<String> {
        let index = SpanIndex::build(spans, len).unwrap();
        IobEncoder::new(&index)
            .encode_all()
            .iter()
            .map(Tag::label)
            .collect()
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin("person").label(), "B-person");
        assert_eq!(Tag::Inside("NP").label(), "I-NP");
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B-person"), Some(Tag::Begin("person")));
        assert_eq!(Tag::from_label("I-WORK-OF-ART"), Some(Tag::Inside("WORK-OF-ART")));
        assert_eq!(Tag::from_label("B-"), None);
        assert_eq!(Tag::from_label("X-NP"), None);
        assert_eq!(Tag::from_label("_"), None);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(Tag::is_valid_transition(&Tag::Begin("NP"), &Tag::Inside("NP")));
        assert!(Tag::is_valid_transition(&Tag::Inside("NP"), &Tag::Inside("NP")));
        assert!(!Tag::is_valid_transition(&Tag::Outside, &Tag::Inside("NP")));
        assert!(!Tag::is_valid_transition(&Tag::Begin("VP"), &Tag::Inside("NP")));
        assert!(Tag::is_valid_transition(&Tag::Outside, &Tag::Begin("NP")));
    }

    #[test]
    fn test_pierre_vinken() {
        let spans = vec![Span::new("person", 0, 1)];
        assert_eq!(
            labels(&spans, 6),
            vec!["B-person", "I-person", "O", "O", "O", "O"]
        );
    }

    #[test]
    fn test_adjacent_same_type_spans_restart() {
        let spans = vec![Span::new("person", 0, 1), Span::new("person", 2, 3)];
        assert_eq!(
            labels(&spans, 4),
            vec!["B-person", "I-person", "B-person", "I-person"]
        );

        let spans = vec![Span::new("person", 0, 0), Span::new("person", 1, 1)];
        assert_eq!(labels(&spans, 2), vec!["B-person", "B-person"]);
    }

    #[test]
    fn test_type_change_without_gap() {
        let spans = vec![Span::new("organization", 0, 1), Span::new("location", 2, 2)];
        assert_eq!(
            labels(&spans, 3),
            vec!["B-organization", "I-organization", "B-location"]
        );
    }

    #[test]
    fn test_single_token_span_and_trailing_span() {
        let spans = vec![Span::new("ADJP", 1, 1), Span::new("NP", 3, 4)];
        assert_eq!(labels(&spans, 5), vec!["O", "B-ADJP", "O", "B-NP", "I-NP"]);
    }

    #[test]
    fn test_spans_given_out_of_order() {
        // a ordem da lista de spans não importa, apenas os índices
        let spans = vec![Span::new("NP", 3, 4), Span::new("NP", 0, 1)];
        assert_eq!(labels(&spans, 5), vec!["B-NP", "I-NP", "O", "B-NP", "I-NP"]);
    }

    #[test]
    fn test_reset_between_sentences() {
        let spans = vec![Span::new("NP", 0, 2)];
        let index = SpanIndex::build(&spans, 3).unwrap();
        let mut encoder = IobEncoder::new(&index);

        assert_eq!(encoder.encode(0), Tag::Begin("NP"));
        assert_eq!(encoder.encode(1), Tag::Inside("NP"));
        encoder.reset();
        assert_eq!(encoder.encode(0), Tag::Begin("NP"));
    }

    #[test]
    fn test_random_access_matches_sequential() {
        let spans = vec![Span::new("NP", 0, 2), Span::new("VP", 3, 4)];
        let index = SpanIndex::build(&spans, 5).unwrap();
        let sequential = IobEncoder::new(&index).encode_all();

        let mut encoder = IobEncoder::new(&index);
        for i in [4, 1, 3, 0, 2] {
            assert_eq!(encoder.encode(i), sequential[i], "token {i}");
        }
    }

    #[test]
    fn test_empty_sentence() {
        assert!(labels(&[], 0).is_empty());
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        /// Gera uma sentença de até 30 tokens com spans não sobrepostos.
        fn layer() -> impl Strategy<Value = (usize, Vec<Span>)> {
            prop::collection::vec((0usize..3, 1usize..4, 0usize..3), 0..8).prop_map(|pieces| {
                let mut spans = Vec::new();
                let mut cursor = 0;
                for (gap, len, kind) in pieces {
                    let start = cursor + gap;
                    let kind = ["person", "location", "NP"][kind];
                    spans.push(Span::new(kind, start, start + len - 1));
                    cursor = start + len;
                }
                (cursor + 2, spans)
            })
        }

        proptest! {
            #[test]
            fn one_label_per_token((len, spans) in layer()) {
                let index = SpanIndex::build(&spans, len).unwrap();
                let tags = IobEncoder::new(&index).encode_all();
                prop_assert_eq!(tags.len(), len);
            }

            #[test]
            fn first_token_never_inside((len, spans) in layer()) {
                let index = SpanIndex::build(&spans, len).unwrap();
                let tags = IobEncoder::new(&index).encode_all();
                prop_assert!(!matches!(tags.first(), Some(Tag::Inside(_))));
            }

            #[test]
            fn every_span_starts_with_begin((len, spans) in layer()) {
                let index = SpanIndex::build(&spans, len).unwrap();
                let tags = IobEncoder::new(&index).encode_all();
                for span in &spans {
                    prop_assert_eq!(tags[span.start], Tag::Begin(span.label.as_str()));
                    for i in span.start + 1..=span.end {
                        prop_assert_eq!(tags[i], Tag::Inside(span.label.as_str()));
                    }
                }
            }

            #[test]
            fn transitions_are_valid((len, spans) in layer()) {
                let index = SpanIndex::build(&spans, len).unwrap();
                let tags = IobEncoder::new(&index).encode_all();
                for pair in tags.windows(2) {
                    prop_assert!(Tag::is_valid_transition(&pair[0], &pair[1]));
                }
            }

            #[test]
            fn encoding_is_idempotent((len, spans) in layer()) {
                let index = SpanIndex::build(&spans, len).unwrap();
                let first = IobEncoder::new(&index).encode_all();
                let second = IobEncoder::new(&index).encode_all();
                prop_assert_eq!(first, second);
            }

            #[test]
            fn decoding_recovers_spans((len, spans) in layer()) {
                let index = SpanIndex::build(&spans, len).unwrap();
                let labels: Vec<String> =
                    IobEncoder::new(&index).encode_all().iter().map(Tag::label).collect();
                prop_assert_eq!(crate::span::decode_spans(&labels), spans);
            }
        }
    }
}
