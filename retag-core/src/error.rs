//! # Erros do Sistema de Reescrita
//!
//! Todas as falhas possíveis do carregamento da tabela até a escrita do
//! arquivo de saída. Erros de tabela e de compilação são fatais: sem um
//! [`RuleSet`](crate::compiler::RuleSet) válido não há o que reescrever.

use std::io;
use std::path::PathBuf;

/// Erro unificado do `retag-core`.
#[derive(Debug, thiserror::Error)]
pub enum RetagError {
    /// A tabela de correspondência não pôde ser aberta ou decodificada como UTF-8.
    #[error("não foi possível ler a tabela '{origin}': {source}")]
    TableRead {
        origin: String,
        #[source]
        source: io::Error,
    },

    /// Registro da tabela que não tem exatamente dois campos não vazios.
    #[error("registro malformado em '{origin}', linha {line}: {record:?} (esperado: ORIGEM UNIVERSAL)")]
    TableFormat {
        origin: String,
        line: usize,
        record: String,
    },

    /// A mesma etiqueta de origem aparece sob duas etiquetas universais.
    #[error("etiqueta de origem '{source_tag}' mapeada para '{existing}' e '{conflicting}'")]
    AmbiguousSourceTag {
        source_tag: String,
        existing: String,
        conflicting: String,
    },

    /// Etiqueta universal sem nenhuma etiqueta de origem.
    #[error("a etiqueta universal '{universal}' não possui etiquetas de origem")]
    EmptyGroup { universal: String },

    /// O motor de regex rejeitou o padrão montado para uma etiqueta universal.
    #[error("falha ao compilar a regra de '{universal}': {source}")]
    RuleCompilation {
        universal: String,
        #[source]
        source: regex::Error,
    },

    /// Registro de token (formato em colunas) que não tem 2 ou 3 campos.
    #[error("registro de token malformado na linha {line}: {record:?}")]
    RecordFormat { line: usize, record: String },

    /// [`RecordFormat`](Self::RecordFormat) vindo de um arquivo de entrada.
    #[error("registro de token malformado em '{}', linha {line}: {record:?}", path.display())]
    InputRecord {
        path: PathBuf,
        line: usize,
        record: String,
    },

    #[error("não foi possível ler a entrada '{}': {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("não foi possível escrever a saída '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("não foi possível ler a configuração '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuração inválida em '{}': {source}", path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, RetagError>;
