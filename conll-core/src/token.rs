//! # Tokens e Tabela de Tokens
//!
//! Tokens chegam prontos dos produtores externos (segmentador, lematizador,
//! etiquetador morfossintático). O núcleo nunca re-tokeniza: apenas lê o texto
//! e os atributos escalares anexados a cada token.
//!
//! A identidade de um token é sua posição dentro da sentença (0, 1, 2...).
//! Na saída CoNLL essa posição aparece como `id` (base 1).

use serde::{Deserialize, Serialize};

/// Um token de uma sentença, com os atributos anexados pelos produtores.
///
/// # Exemplo
/// Em "Pierre Vinken, 61 years old", o token "years":
/// `Token { text: "years", lemma: Some("year"), pos: Some("NNS") }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Texto coberto pelo token (ex: "Vinken", ",").
    pub text: String,
    /// Lema, quando um lematizador rodou antes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    /// Tag morfossintática (ex: "NNP"), quando disponível.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lemma: None,
            pos: None,
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }
}

/// Visão imutável dos tokens de uma sentença.
///
/// Não copia nada: apenas empresta a fatia de tokens da [`Sentence`](crate::document::Sentence)
/// e oferece acesso por índice aos atributos de cada token.
#[derive(Debug, Clone, Copy)]
pub struct TokenTable<'a> {
    tokens: &'a [Token],
}

impl<'a> TokenTable<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index)
    }

    pub fn text(&self, index: usize) -> Option<&'a str> {
        self.get(index).map(|t| t.text.as_str())
    }

    pub fn lemma(&self, index: usize) -> Option<&'a str> {
        self.get(index).and_then(|t| t.lemma.as_deref())
    }

    pub fn pos(&self, index: usize) -> Option<&'a str> {
        self.get(index).and_then(|t| t.pos.as_deref())
    }

    /// Itera na ordem da sentença.
    pub fn iter(&self) -> std::slice::Iter<'a, Token> {
        self.tokens.iter()
    }
}
