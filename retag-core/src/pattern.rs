//! # Padrões de Token: Etiqueta → Fragmento de Regex
//!
//! Converte uma etiqueta de origem em um fragmento de expressão regular que
//! só casa com a etiqueta como **token completo**.
//!
//! ## Algoritmo
//!
//! 1. Escapa todos os metacaracteres (`$`, `(`, `.`, ...) da etiqueta.
//! 2. Decide a fronteira de cada borda (início e fim) de forma independente:
//!    - borda de palavra → fronteira de palavra (`\b`);
//!    - senão, se a etiqueta tem algum caractere de palavra ou `-` →
//!      não-fronteira (`\B`), para que `-LRB-` não grude em uma palavra;
//!    - senão (pontuação pura, como `''` ou `:`) → sem asserção.
//! 3. Concatena `[início] + literal + [fim]`.
//!
//! | Etiqueta | Fragmento        |
//! |----------|------------------|
//! | `NN`     | `\bNN\b`         |
//! | `PRP$`   | `\bPRP\$\B`      |
//! | `-LRB-`  | `\B\-LRB\-\B`    |
//! | `''`     | `''`             |
//!
//! "Caractere de palavra" é o `\w` Unicode do próprio motor de regex (o mesmo
//! que decide `\b` e `\B`), e não `char::is_alphanumeric`: `²` é alfanumérico
//! mas não é `\w`, e marcas combinantes (U+0301) são `\w` sem serem alfanuméricas.
//!
//! A função é pura: não depende da tabela nem de estado compartilhado.

use serde::{Deserialize, Serialize};

/// Asserção de largura zero aplicada a uma borda da etiqueta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// `\b`: a borda não pode estar colada a outro caractere de palavra.
    WordEdge,
    /// `\B`: a borda (pontuação) não pode formar fronteira com uma palavra vizinha.
    NonWordEdge,
    /// Sem asserção (etiqueta de pontuação pura).
    Open,
}

impl Boundary {
    pub fn assertion(self) -> &'static str {
        match self {
            Boundary::WordEdge => r"\b",
            Boundary::NonWordEdge => r"\B",
            Boundary::Open => "",
        }
    }

    /// Fronteira exigida por uma borda, dado o caractere da borda e a etiqueta inteira.
    pub fn for_edge(edge: Option<char>, tag: &str) -> Self {
        match edge {
            Some(c) if is_word_char(c) => Boundary::WordEdge,
            Some(_) if tag.chars().any(|c| is_word_char(c) || c == '-') => {
                Boundary::NonWordEdge
            }
            _ => Boundary::Open,
        }
    }
}

/// Caractere que forma palavra para as asserções `\b`/`\B` do motor de regex.
pub fn is_word_char(c: char) -> bool {
    regex_syntax::is_word_character(c)
}

/// Padrão compilável de uma etiqueta de origem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPattern {
    /// A etiqueta original, sem escape.
    pub source: String,
    pub start: Boundary,
    pub end: Boundary,
    /// Fragmento de regex pronto para entrar numa alternância.
    pub fragment: String,
}

impl TokenPattern {
    pub fn new(tag: &str) -> Self {
        let start = Boundary::for_edge(tag.chars().next(), tag);
        let end = Boundary::for_edge(tag.chars().next_back(), tag);
        let fragment = format!(
            "{}{}{}",
            start.assertion(),
            regex::escape(tag),
            end.assertion()
        );
        Self {
            source: tag.to_string(),
            start,
            end,
            fragment,
        }
    }

    /// Comprimento da etiqueta original em caracteres (critério de ordenação).
    pub fn source_len(&self) -> usize {
        self.source.chars().count()
    }
}

/// Fragmento de regex de uma etiqueta (atalho para [`TokenPattern::new`]).
pub fn token_pattern(tag: &str) -> String {
    TokenPattern::new(tag).fragment
}
