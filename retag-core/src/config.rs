//! # Configuração
//!
//! A configuração pode vir de um arquivo JSON, de variáveis de ambiente
//! (servidor web) ou de flags da linha de comando, que sobrescrevem o arquivo.
//!
//! ```json
//! {
//!   "tables": ["POSTags_PTB_Universal.txt"],
//!   "format": "conll",
//!   "builtin_ner": true,
//!   "parallel": false
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetagError};

/// Formato do arquivo de entrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// **Linhas**: cada linha é texto livre com etiquetas embutidas; a linha
    /// inteira passa pelo reescritor.
    Lines,
    /// **Colunas**: saída do etiquetador externo (`token TAG [NER]`, linha em
    /// branco entre sentenças). Só os campos de etiqueta são reescritos.
    Conll,
}

impl Default for InputFormat {
    fn default() -> Self {
        InputFormat::Lines
    }
}

/// Configuração do pipeline de reescrita.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetagConfig {
    /// Tabelas de correspondência, unidas na ordem dada.
    pub tables: Vec<PathBuf>,
    pub format: InputFormat,
    /// Une a tabela NER CoNLL embutida. `None` = só no formato `conll`.
    pub builtin_ner: Option<bool>,
    /// Reescreve as linhas em paralelo (rayon).
    pub parallel: bool,
}

impl RetagConfig {
    /// Configuração mínima com uma única tabela.
    pub fn with_table(path: impl Into<PathBuf>) -> Self {
        Self {
            tables: vec![path.into()],
            ..Self::default()
        }
    }

    /// Lê um arquivo JSON de configuração.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RetagError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RetagError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configuração a partir do ambiente: `RETAG_CONFIG` (arquivo JSON) tem
    /// prioridade; senão `RETAG_TABLE` aponta para uma tabela única.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var("RETAG_CONFIG") {
            return Self::load(path);
        }
        Ok(match std::env::var("RETAG_TABLE") {
            Ok(table) => Self::with_table(table),
            Err(_) => Self::default(),
        })
    }

    pub fn uses_builtin_ner(&self) -> bool {
        self.builtin_ner.unwrap_or(self.format == InputFormat::Conll)
    }
}
