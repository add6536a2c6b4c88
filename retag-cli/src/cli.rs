use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use retag_core::{InputFormat, RetagConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tabela de correspondência (`ORIGEM UNIVERSAL` por linha)
    pub table: PathBuf,

    /// Arquivo de entrada
    pub source: PathBuf,

    /// Arquivo de saída
    pub destination: PathBuf,

    /// Formato da entrada
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Tabelas adicionais, unidas depois da principal
    #[arg(short = 't', long = "extra-table", value_name = "FILE")]
    pub extra_tables: Vec<PathBuf>,

    /// Une a tabela NER CoNLL embutida (padrão apenas no formato conll)
    #[arg(long, overrides_with = "no_builtin_ner")]
    pub builtin_ner: bool,

    /// Nunca une a tabela NER embutida
    #[arg(long, overrides_with = "builtin_ner")]
    pub no_builtin_ner: bool,

    /// Reescreve as linhas em paralelo
    #[arg(short, long)]
    pub parallel: bool,

    /// Configuração JSON usada como base para as opções acima
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log detalhado (regras compiladas)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Lines,
    Conll,
}

impl From<Format> for InputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Lines => InputFormat::Lines,
            Format::Conll => InputFormat::Conll,
        }
    }
}

impl Cli {
    /// Aplica os argumentos sobre a configuração base.
    ///
    /// A tabela posicional entra antes das tabelas do arquivo de configuração.
    pub fn apply_to(&self, mut config: RetagConfig) -> RetagConfig {
        let mut tables = vec![self.table.clone()];
        tables.append(&mut config.tables);
        tables.extend(self.extra_tables.iter().cloned());
        config.tables = tables;

        if let Some(format) = self.format {
            config.format = format.into();
        }
        if self.builtin_ner {
            config.builtin_ner = Some(true);
        } else if self.no_builtin_ner {
            config.builtin_ner = Some(false);
        }
        config.parallel |= self.parallel;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_paths() {
        let cli = Cli::parse_from(["retag", "ptb.txt", "in.txt", "out.txt"]);
        let config = cli.apply_to(RetagConfig::default());
        assert_eq!(config.tables, vec![PathBuf::from("ptb.txt")]);
        assert_eq!(config.format, InputFormat::Lines);
        assert_eq!(config.builtin_ner, None);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "retag", "ptb.txt", "in.txt", "out.txt", "--format", "conll", "--no-builtin-ner",
            "-t", "extra.txt", "--parallel",
        ]);
        let base = RetagConfig {
            tables: vec![PathBuf::from("base.txt")],
            ..RetagConfig::default()
        };
        let config = cli.apply_to(base);
        assert_eq!(
            config.tables,
            vec![
                PathBuf::from("ptb.txt"),
                PathBuf::from("base.txt"),
                PathBuf::from("extra.txt")
            ]
        );
        assert_eq!(config.format, InputFormat::Conll);
        assert!(!config.uses_builtin_ner());
        assert!(config.parallel);
    }

    #[test]
    fn test_last_ner_flag_wins() {
        let cli = Cli::parse_from([
            "retag", "t", "i", "o", "--no-builtin-ner", "--builtin-ner",
        ]);
        assert!(cli.builtin_ner);
        assert!(!cli.no_builtin_ner);
    }

    #[test]
    fn test_missing_paths_is_error() {
        assert!(Cli::try_parse_from(["retag", "ptb.txt"]).is_err());
    }
}
