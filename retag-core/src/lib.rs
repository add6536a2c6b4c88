//! # retag-core: Conversão de Etiquetas POS/NER para o Esquema Universal
//!
//! Este crate converte etiquetas de um esquema de origem (Penn Treebank para
//! POS, CoNLL para NER) em um esquema universal mais grosso, usando uma tabela
//! de correspondência muitos-para-um. A conversão é feita como uma sequência
//! de **substituições de texto**, e não campo a campo: o mesmo mecanismo
//! serve para pós-processar qualquer arquivo etiquetado e para rodar dentro
//! de um pipeline de etiquetagem maior.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Tabela** ([`table`]): `ORIGEM UNIVERSAL` por linha, agrupada por etiqueta universal.
//! 2.  **Padrões** ([`pattern`]): cada etiqueta de origem vira um fragmento de regex
//!     escapado, com fronteiras calculadas a partir das próprias bordas.
//! 3.  **Compilação** ([`compiler`]): uma alternância por etiqueta universal, da
//!     etiqueta mais longa para a mais curta.
//! 4.  **Reescrita** ([`rewriter`]): *fold* das regras sobre cada linha.
//! 5.  **Pipeline** ([`pipeline`]): arquivo → arquivo, streaming de eventos, ou
//!     registros `token\tTAG\tNER` vindos do etiquetador externo ([`toolkit`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use retag_core::{CorrespondenceTable, LineRewriter, RuleSet};
//!
//! # fn main() -> Result<(), retag_core::RetagError> {
//! let mut table = CorrespondenceTable::parse("NN NOUN\nNNS NOUN\nJJ ADJ\nDT DET\nNNP NOUN\n")?;
//! table.merge(&CorrespondenceTable::conll_ner())?;
//!
//! let rules = RuleSet::compile(&table)?;
//! let rewriter = LineRewriter::new(&rules);
//!
//! assert_eq!(rewriter.rewrite("DT\tJJ\tO\n"), "DET\tADJ\tO\n");
//! assert_eq!(rewriter.rewrite("Acme\tNNP\tI-ORGANIZATION\n"), "Acme\tNOUN\tI-ORG\n");
//! // "NN" colado em outra palavra não é um token
//! assert_eq!(rewriter.rewrite("The_NN_runs"), "The_NN_runs");
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod record;
pub mod rewriter;
pub mod table;
pub mod toolkit;

pub use compiler::{unbounded_overlaps, Overlap, RewriteRule, RuleSet, RuleSummary};
pub use config::{InputFormat, RetagConfig};
pub use error::{Result, RetagError};
pub use pattern::{token_pattern, Boundary, TokenPattern};
pub use pipeline::{PipelineEvent, RetagPipeline, Rewritten, RunSummary};
pub use record::{TaggedSentence, TokenRecord};
pub use rewriter::{LineRewriter, RewriteStep};
pub use table::{CorrespondenceTable, TagGroup};
pub use toolkit::{ConllReader, Tagger};
