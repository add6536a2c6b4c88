//! # Contrato com o Kit de PLN Externo
//!
//! Tokenização, etiquetagem POS e chunking de entidades ficam fora deste
//! crate. O que consumimos é só o contrato de saída: uma sequência de
//! sentenças, cada uma com tuplas `(token, POS)` ou `(token, POS, NER)`.
//!
//! Qualquer etiquetador pode ser plugado implementando [`Tagger`]. O
//! [`ConllReader`] lê a saída do etiquetador já materializada em colunas
//! (estilo CoNLL), uma linha por token e uma linha em branco entre sentenças:
//!
//! ```text
//! Acme      NNP  B-ORGANIZATION
//! hired     VBD  O
//!
//! Monday    NNP  DATE
//! ```

use crate::error::Result;
use crate::record::{TaggedSentence, TokenRecord};

/// Fonte de sentenças etiquetadas.
pub trait Tagger {
    /// Etiqueta um documento inteiro e devolve as sentenças em ordem.
    fn tag_document(&self, text: &str) -> Result<Vec<TaggedSentence>>;
}

/// Leitor de documentos já etiquetados em colunas.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConllReader;

impl Tagger for ConllReader {
    fn tag_document(&self, text: &str) -> Result<Vec<TaggedSentence>> {
        let mut sentences = Vec::new();
        let mut current: TaggedSentence = Vec::new();

        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    sentences.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push(TokenRecord::parse(line, i + 1)?);
        }
        if !current.is_empty() {
            sentences.push(current);
        }

        Ok(sentences)
    }
}
