//! # Reescritor de Linhas
//!
//! Aplica um [`RuleSet`] a uma unidade de texto (uma linha, ou um registro
//! `token\tTAG\tNER`). A reescrita é um *fold* sobre as regras: cada regra
//! substitui **todas** as suas ocorrências no estado atual da linha e entrega
//! um novo valor para a próxima regra.
//!
//! ```text
//! "DT\tJJ\tO\n"  --NOUN-->  "DT\tJJ\tO\n"  --ADJ-->  "DT\tADJ\tO\n"  --DET-->  "DET\tADJ\tO\n"
//! ```
//!
//! Não há I/O nem estado entre linhas: o mesmo `RuleSet` pode ser usado por
//! várias threads ao mesmo tempo (ver [`LineRewriter::rewrite_all_par`]).

use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::compiler::RuleSet;

/// Um passo de reescrita em que a linha mudou (usado para rastreamento e streaming).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteStep {
    /// Etiqueta universal da regra aplicada.
    pub universal: String,
    pub before: String,
    pub after: String,
}

/// Aplica as regras compiladas a linhas de texto.
#[derive(Debug, Clone, Copy)]
pub struct LineRewriter<'r> {
    rules: &'r RuleSet,
}

impl<'r> LineRewriter<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r RuleSet {
        self.rules
    }

    /// Reescreve uma linha aplicando todas as regras em ordem.
    pub fn rewrite(&self, line: &str) -> String {
        self.rules
            .iter()
            .fold(line.to_string(), |current, rule| {
                let next = match rule.apply(&current) {
                    Cow::Owned(rewritten) => Some(rewritten),
                    Cow::Borrowed(_) => None,
                };
                next.unwrap_or(current)
            })
    }

    /// Como [`rewrite`](Self::rewrite), mas registra cada regra que alterou a linha.
    pub fn rewrite_traced(&self, line: &str) -> (String, Vec<RewriteStep>) {
        let mut steps = Vec::new();
        let mut current = line.to_string();

        for rule in self.rules {
            let next = match rule.apply(&current) {
                Cow::Owned(rewritten) => rewritten,
                Cow::Borrowed(_) => continue,
            };
            let before = std::mem::replace(&mut current, next);
            steps.push(RewriteStep {
                universal: rule.universal().to_string(),
                before,
                after: current.clone(),
            });
        }

        (current, steps)
    }

    /// Reescreve uma sequência de linhas, em ordem.
    pub fn rewrite_all<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        lines.iter().map(|l| self.rewrite(l.as_ref())).collect()
    }

    /// Reescreve em paralelo (rayon). A ordem de saída é a mesma da entrada.
    pub fn rewrite_all_par<S: AsRef<str> + Sync>(&self, lines: &[S]) -> Vec<String> {
        lines.par_iter().map(|l| self.rewrite(l.as_ref())).collect()
    }
}
