//! # Tabela de Correspondência: Origem → Universal
//!
//! Carrega a tabela que associa cada etiqueta do esquema de origem (Penn
//! Treebank, CoNLL, ...) à sua etiqueta universal. O arquivo tem um registro
//! por linha, com dois campos separados por espaço em branco:
//!
//! ```text
//! NN   NOUN
//! NNS  NOUN
//! JJ   ADJ
//! DT   DET
//! ```
//!
//! Internamente a tabela é agrupada pela etiqueta universal, porque é essa a
//! unidade que o compilador transforma em uma única regra de reescrita.
//!
//! ## Invariante
//!
//! Cada etiqueta de origem aparece sob **exatamente uma** etiqueta universal.
//! Um mapeamento ambíguo é um erro de carga, nunca uma fusão silenciosa.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RetagError};

/// Uma etiqueta universal e as etiquetas de origem que convergem para ela.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    /// Etiqueta universal (ex: "NOUN", "I-ORG").
    pub universal: String,
    /// Etiquetas de origem em ordem de primeira aparição (ex: ["NN", "NNS", "NNP"]).
    pub sources: Vec<String>,
}

/// Tabela de correspondência carregada.
///
/// Mantém os grupos na ordem em que as etiquetas universais aparecem pela
/// primeira vez, e um índice reverso origem → grupo para validar a
/// unicidade do mapeamento.
#[derive(Debug, Clone, Default)]
pub struct CorrespondenceTable {
    groups: Vec<TagGroup>,
    by_source: HashMap<String, usize>,
}

impl CorrespondenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega a tabela a partir de um arquivo.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| RetagError::TableRead {
            origin: origin.clone(),
            source,
        })?;
        let table = Self::from_reader(BufReader::new(file), &origin)?;
        debug!(
            "Tabela '{}' carregada: {} etiquetas universais, {} de origem",
            origin,
            table.len(),
            table.source_count()
        );
        Ok(table)
    }

    /// Lê registros `ORIGEM UNIVERSAL` de qualquer leitor bufferizado.
    ///
    /// `origin` só é usado nas mensagens de erro (nome do arquivo, "<stdin>", ...).
    /// Linhas em branco são ignoradas; não há sintaxe de comentário porque `#`
    /// é uma etiqueta válida do Penn Treebank.
    pub fn from_reader<R: BufRead>(reader: R, origin: &str) -> Result<Self> {
        let mut table = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| RetagError::TableRead {
                origin: origin.to_string(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [source_tag, universal] = fields.as_slice() else {
                return Err(RetagError::TableFormat {
                    origin: origin.to_string(),
                    line: i + 1,
                    record: line.clone(),
                });
            };
            table.insert(source_tag, universal)?;
        }
        Ok(table)
    }

    /// Atalho para tabelas em memória (testes, configuração embutida).
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes(), "<memória>")
    }

    /// Adiciona um mapeamento `source → universal`.
    ///
    /// Retorna `false` se o par exato já existia (duplicata ignorada) e
    /// erro se `source` já pertence a outra etiqueta universal.
    pub fn insert(&mut self, source: &str, universal: &str) -> Result<bool> {
        if let Some(&idx) = self.by_source.get(source) {
            let existing = &self.groups[idx].universal;
            if existing == universal {
                return Ok(false);
            }
            return Err(RetagError::AmbiguousSourceTag {
                source_tag: source.to_string(),
                existing: existing.clone(),
                conflicting: universal.to_string(),
            });
        }
        let idx = self.group_index(universal);
        self.groups[idx].sources.push(source.to_string());
        self.by_source.insert(source.to_string(), idx);
        Ok(true)
    }

    /// Declara um grupo inteiro de uma vez.
    ///
    /// Um grupo sem etiquetas de origem é aceito aqui e recusado pelo
    /// compilador com [`RetagError::EmptyGroup`].
    pub fn insert_group(&mut self, universal: &str, sources: &[&str]) -> Result<()> {
        self.group_index(universal);
        for source in sources {
            self.insert(source, universal)?;
        }
        Ok(())
    }

    /// Une outra tabela a esta, grupo a grupo, respeitando a mesma invariante.
    pub fn merge(&mut self, other: &CorrespondenceTable) -> Result<()> {
        for group in &other.groups {
            let sources: Vec<&str> = group.sources.iter().map(String::as_str).collect();
            self.insert_group(&group.universal, &sources)?;
        }
        Ok(())
    }

    /// Tabela CoNLL → universal para as etiquetas NER produzidas pelo chunker.
    ///
    /// | Universal | Origem                          |
    /// |-----------|---------------------------------|
    /// | I-ORG     | I-ORGANIZATION, FACILITY        |
    /// | B-ORG     | B-ORGANIZATION                  |
    /// | I-PERS    | I-PERSON                        |
    /// | B-PERS    | B-PERSON                        |
    /// | I-LOC     | I-LOCATION                      |
    /// | B-LOC     | B-LOCATION                      |
    /// | MISC      | DATE, TIME, MONEY, PERCENT      |
    pub fn conll_ner() -> Self {
        const GROUPS: &[(&str, &[&str])] = &[
            ("I-ORG", &["I-ORGANIZATION", "FACILITY"]),
            ("B-ORG", &["B-ORGANIZATION"]),
            ("I-PERS", &["I-PERSON"]),
            ("B-PERS", &["B-PERSON"]),
            ("I-LOC", &["I-LOCATION"]),
            ("B-LOC", &["B-LOCATION"]),
            ("MISC", &["DATE", "TIME", "MONEY", "PERCENT"]),
        ];

        let mut table = Self::new();
        for (universal, sources) in GROUPS {
            let inserted = table.insert_group(universal, sources);
            debug_assert!(inserted.is_ok(), "tabela NER embutida ambígua: {inserted:?}");
        }
        table
    }

    /// Etiqueta universal de uma etiqueta de origem, se mapeada.
    pub fn universal_for(&self, source: &str) -> Option<&str> {
        self.by_source
            .get(source)
            .map(|&idx| self.groups[idx].universal.as_str())
    }

    pub fn groups(&self) -> &[TagGroup] {
        &self.groups
    }

    /// Número de etiquetas universais.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Número total de etiquetas de origem.
    pub fn source_count(&self) -> usize {
        self.by_source.len()
    }

    fn group_index(&mut self, universal: &str) -> usize {
        if let Some(idx) = self.groups.iter().position(|g| g.universal == universal) {
            return idx;
        }
        self.groups.push(TagGroup {
            universal: universal.to_string(),
            sources: Vec::new(),
        });
        self.groups.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PTB_SAMPLE: &str = "NN NOUN\nNNS NOUN\nJJ ADJ\n\nDT\tDET\nNNP   NOUN\n";

    #[test]
    fn test_groups_by_universal_in_first_seen_order() {
        let table = CorrespondenceTable::parse(PTB_SAMPLE).unwrap();
        let universals: Vec<&str> = table.groups().iter().map(|g| g.universal.as_str()).collect();
        assert_eq!(universals, vec!["NOUN", "ADJ", "DET"]);
        assert_eq!(table.groups()[0].sources, vec!["NN", "NNS", "NNP"]);
        assert_eq!(table.source_count(), 5);
    }

    #[test]
    fn test_universal_for() {
        let table = CorrespondenceTable::parse(PTB_SAMPLE).unwrap();
        assert_eq!(table.universal_for("NNS"), Some("NOUN"));
        assert_eq!(table.universal_for("DT"), Some("DET"));
        assert_eq!(table.universal_for("VB"), None);
    }

    #[test]
    fn test_malformed_record_reports_line() {
        let err = CorrespondenceTable::parse("NN NOUN\nJJ\n").unwrap_err();
        match err {
            RetagError::TableFormat { line, record, .. } => {
                assert_eq!(line, 2);
                assert_eq!(record, "JJ");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn test_three_fields_is_malformed() {
        let err = CorrespondenceTable::parse("NN NOUN extra\n").unwrap_err();
        assert!(matches!(err, RetagError::TableFormat { line: 1, .. }));
    }

    #[test]
    fn test_ambiguous_mapping_is_rejected() {
        let err = CorrespondenceTable::parse("NN NOUN\nNN PROPN\n").unwrap_err();
        assert!(matches!(
            err,
            RetagError::AmbiguousSourceTag { ref source_tag, .. } if source_tag == "NN"
        ));
    }

    #[test]
    fn test_exact_duplicate_is_ignored() {
        let table = CorrespondenceTable::parse("NN NOUN\nNN NOUN\n").unwrap();
        assert_eq!(table.groups()[0].sources, vec!["NN"]);
    }

    #[test]
    fn test_punctuation_tags_are_plain_records() {
        let table = CorrespondenceTable::parse("# .\n$ .\n'' .\n-LRB- .\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.universal_for("#"), Some("."));
        assert_eq!(table.universal_for("-LRB-"), Some("."));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let bytes: &[u8] = b"NN NOUN\n\xff\xfe X\n";
        let err = CorrespondenceTable::from_reader(bytes, "binário").unwrap_err();
        assert!(matches!(err, RetagError::TableRead { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = CorrespondenceTable::load("/caminho/que/nao/existe.txt").unwrap_err();
        assert!(matches!(err, RetagError::TableRead { .. }));
    }

    #[test]
    fn test_merge_with_conll_ner() {
        let mut table = CorrespondenceTable::parse(PTB_SAMPLE).unwrap();
        table.merge(&CorrespondenceTable::conll_ner()).unwrap();
        assert_eq!(table.universal_for("FACILITY"), Some("I-ORG"));
        assert_eq!(table.universal_for("NN"), Some("NOUN"));
        assert_eq!(table.len(), 3 + 7);
    }

    #[test]
    fn test_conll_ner_literal() {
        let ner = CorrespondenceTable::conll_ner();
        assert_eq!(ner.len(), 7);
        assert_eq!(ner.source_count(), 11);
        assert_eq!(ner.groups()[0].sources, vec!["I-ORGANIZATION", "FACILITY"]);
        assert_eq!(ner.universal_for("PERCENT"), Some("MISC"));
    }

    #[test]
    fn test_merge_conflict() {
        let mut table = CorrespondenceTable::parse("DATE NOUN\n").unwrap();
        let err = table.merge(&CorrespondenceTable::conll_ner()).unwrap_err();
        assert!(matches!(err, RetagError::AmbiguousSourceTag { .. }));
    }

    #[test]
    fn test_insert_group_allows_empty() {
        let mut table = CorrespondenceTable::new();
        table.insert_group("X", &[]).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.groups()[0].sources.is_empty());
    }
}
