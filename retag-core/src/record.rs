//! # Registros de Token
//!
//! O kit de PLN externo entrega, por sentença, tuplas `(token, POS)` ou
//! `(token, POS, NER)`. Este módulo serializa essas tuplas no formato de
//! linha consumido pelo reescritor:
//!
//! ```text
//! token<TAB>ETIQUETA<TAB>NER<NEWLINE>
//! ```
//!
//! e faz o caminho inverso ao ler saídas já materializadas em colunas.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetagError};
use crate::rewriter::LineRewriter;

/// Uma tupla do kit externo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Texto do token (nunca é reescrito).
    pub token: String,
    /// Etiqueta POS no esquema de origem (ex: "NNP").
    pub tag: String,
    /// Rótulo NER no esquema de origem (ex: "I-ORGANIZATION"), se houver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ner: Option<String>,
}

/// Sentença = tokens na ordem da esquerda para a direita.
pub type TaggedSentence = Vec<TokenRecord>;

impl TokenRecord {
    pub fn new(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tag: tag.into(),
            ner: None,
        }
    }

    pub fn with_ner(mut self, ner: impl Into<String>) -> Self {
        self.ner = Some(ner.into());
        self
    }

    /// Lê um registro em colunas (tabulação ou espaços): `token TAG [NER]`.
    ///
    /// `line_no` é 1-based e só aparece na mensagem de erro.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<&str> = if line.contains('\t') {
            line.trim_end_matches(['\r', '\n']).split('\t').collect()
        } else {
            line.split_whitespace().collect()
        };

        match fields.as_slice() {
            [token, tag] if !token.is_empty() && !tag.is_empty() => Ok(Self::new(*token, *tag)),
            [token, tag, ner] if !token.is_empty() && !tag.is_empty() && !ner.is_empty() => {
                Ok(Self::new(*token, *tag).with_ner(*ner))
            }
            _ => Err(RetagError::RecordFormat {
                line: line_no,
                record: line.trim_end().to_string(),
            }),
        }
    }

    /// Linha `token\tTAG[\tNER]\n`.
    pub fn to_line(&self) -> String {
        match &self.ner {
            Some(ner) => format!("{}\t{}\t{}\n", self.token, self.tag, ner),
            None => format!("{}\t{}\n", self.token, self.tag),
        }
    }

    /// Reescreve os campos de etiqueta; o texto do token é preservado.
    pub fn rewrite(&self, rewriter: &LineRewriter<'_>) -> Self {
        Self {
            token: self.token.clone(),
            tag: rewriter.rewrite(&self.tag),
            ner: self.ner.as_deref().map(|ner| rewriter.rewrite(ner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::RuleSet;
    use crate::table::CorrespondenceTable;

    #[test]
    fn test_to_line() {
        let r = TokenRecord::new("Acme", "NNP").with_ner("I-ORGANIZATION");
        assert_eq!(r.to_line(), "Acme\tNNP\tI-ORGANIZATION\n");
        assert_eq!(TokenRecord::new("runs", "VBZ").to_line(), "runs\tVBZ\n");
    }

    #[test]
    fn test_parse_tab_and_space_columns() {
        let tab = TokenRecord::parse("Acme\tNNP\tB-ORGANIZATION\n", 1).unwrap();
        assert_eq!(tab.ner.as_deref(), Some("B-ORGANIZATION"));

        let spaces = TokenRecord::parse("Acme   NNP", 1).unwrap();
        assert_eq!(spaces, TokenRecord::new("Acme", "NNP"));
    }

    #[test]
    fn test_tab_columns_keep_inner_spaces() {
        let r = TokenRecord::parse("New York\tNNP\tB-GPE", 3).unwrap();
        assert_eq!(r.token, "New York");
    }

    #[test]
    fn test_parse_rejects_bad_arity() {
        assert!(matches!(
            TokenRecord::parse("sozinho", 4),
            Err(RetagError::RecordFormat { line: 4, .. })
        ));
        assert!(TokenRecord::parse("a b c d", 5).is_err());
        assert!(TokenRecord::parse("a\t\tO", 6).is_err());
    }

    #[test]
    fn test_rewrite_leaves_token_text() {
        let mut table = CorrespondenceTable::parse("NNP NOUN\nIN ADP\n").unwrap();
        table.merge(&CorrespondenceTable::conll_ner()).unwrap();
        let rules = RuleSet::compile(&table).unwrap();
        let rw = LineRewriter::new(&rules);

        // O token "IN" é uma palavra, não uma etiqueta
        let r = TokenRecord::new("IN", "NNP").with_ner("I-ORGANIZATION");
        let out = r.rewrite(&rw);
        assert_eq!(out.to_line(), "IN\tNOUN\tI-ORG\n");
    }
}
