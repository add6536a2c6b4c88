//! # Compilador de Regras de Reescrita
//!
//! Para cada etiqueta universal da tabela, agrega os padrões de todas as suas
//! etiquetas de origem em **uma única** alternância:
//!
//! ```text
//! NOUN ← {NN, NNS, NNP, NNPS}
//!   =>  \bNNPS\b|\bNNS\b|\bNNP\b|\bNN\b   →   "NOUN"
//! ```
//!
//! ## Por que ordenar do maior para o menor?
//!
//! A alternância tenta as opções da esquerda para a direita e fica com a
//! primeira que casa numa posição. Se `'` viesse antes de `''` (etiquetas sem
//! fronteira de palavra), a linha `''` seria reescrita duas vezes. A ordem é
//! pelo comprimento da etiqueta **original**, não do fragmento escapado.

use std::borrow::Cow;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, RetagError};
use crate::pattern::{Boundary, TokenPattern};
use crate::table::{CorrespondenceTable, TagGroup};

/// Uma regra: casador agregado das etiquetas de origem → etiqueta universal.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    universal: String,
    patterns: Vec<TokenPattern>,
    matcher: Regex,
}

/// Resumo serializável de uma regra (para logs e para a API web).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSummary {
    pub universal: String,
    pub sources: Vec<String>,
    pub pattern: String,
}

impl RewriteRule {
    /// Compila um grupo da tabela.
    pub fn compile(group: &TagGroup) -> Result<Self> {
        if group.sources.is_empty() {
            return Err(RetagError::EmptyGroup {
                universal: group.universal.clone(),
            });
        }

        let mut patterns: Vec<TokenPattern> = group
            .sources
            .iter()
            .map(|source| TokenPattern::new(source))
            .collect();
        // sort_by é estável: empates mantêm a ordem da tabela
        patterns.sort_by(|a, b| b.source_len().cmp(&a.source_len()));

        let alternation = patterns
            .iter()
            .map(|p| p.fragment.as_str())
            .collect::<Vec<_>>()
            .join("|");

        let matcher = Regex::new(&alternation).map_err(|source| RetagError::RuleCompilation {
            universal: group.universal.clone(),
            source,
        })?;

        Ok(Self {
            universal: group.universal.clone(),
            patterns,
            matcher,
        })
    }

    pub fn universal(&self) -> &str {
        &self.universal
    }

    /// Padrões na ordem em que aparecem na alternância.
    pub fn patterns(&self) -> &[TokenPattern] {
        &self.patterns
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Substitui todas as ocorrências em `text` pela etiqueta universal.
    ///
    /// `NoExpand` insere a etiqueta literalmente: `$1` ou `\1` numa etiqueta
    /// universal nunca são interpretados como referência a grupo.
    /// Devolve `Cow::Borrowed` quando nada casou.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.matcher
            .replace_all(text, NoExpand(self.universal.as_str()))
    }

    pub fn summary(&self) -> RuleSummary {
        RuleSummary {
            universal: self.universal.clone(),
            sources: self.patterns.iter().map(|p| p.source.clone()).collect(),
            pattern: self.pattern().to_string(),
        }
    }
}

/// Conjunto ordenado de regras, uma por etiqueta universal, na ordem da tabela.
///
/// Depois de compilado é somente leitura e pode ser compartilhado entre threads.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn compile(table: &CorrespondenceTable) -> Result<Self> {
        let rules = table
            .groups()
            .iter()
            .map(RewriteRule::compile)
            .collect::<Result<Vec<_>>>()?;

        for rule in &rules {
            debug!("Regra compilada: {} ← /{}/", rule.universal(), rule.pattern());
        }
        for overlap in unbounded_overlaps(table) {
            warn!(
                "'{}' ({}) não tem fronteira e será aplicada antes de '{}' ({}): \
                 as etiquetas de origem deveriam ser disjuntas",
                overlap.source, overlap.universal, overlap.shadowed, overlap.shadowed_universal
            );
        }

        Ok(Self { rules })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RewriteRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, universal: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|r| r.universal == universal)
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules.iter().map(RewriteRule::summary).collect()
    }
}

/// Etiqueta sem fronteira contida numa etiqueta de outro grupo, cuja regra
/// roda depois e portanto recebe a etiqueta já corrompida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub source: String,
    pub universal: String,
    pub shadowed: String,
    pub shadowed_universal: String,
}

/// Sobreposições que violam a disjunção das etiquetas de origem.
///
/// Ex.: na tabela PTB, `$` (grupo `.`, sem asserções) vem antes de
/// `PRP$ PRON` e transforma `PRP$` em `PRP.`.
pub fn unbounded_overlaps(table: &CorrespondenceTable) -> Vec<Overlap> {
    let groups = table.groups();
    let mut overlaps = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        for source in &group.sources {
            let pattern = TokenPattern::new(source);
            if pattern.start != Boundary::Open && pattern.end != Boundary::Open {
                continue;
            }
            for later in &groups[i + 1..] {
                for other in &later.sources {
                    if other != source && other.contains(source.as_str()) {
                        overlaps.push(Overlap {
                            source: source.clone(),
                            universal: group.universal.clone(),
                            shadowed: other.clone(),
                            shadowed_universal: later.universal.clone(),
                        });
                    }
                }
            }
        }
    }
    overlaps
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RewriteRule;
    type IntoIter = std::slice::Iter<'a, RewriteRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
