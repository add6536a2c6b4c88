//! # Pipeline de Reescrita: Orquestrador com Eventos Observáveis
//!
//! Carrega e compila as tabelas uma única vez e depois faz passar pelo
//! [`LineRewriter`] cada unidade da entrada:
//!
//! - no formato [`InputFormat::Lines`], cada linha do texto (com o `\n`);
//! - no formato [`InputFormat::Conll`], cada registro `token\tTAG\tNER`
//!   produzido a partir das sentenças do etiquetador externo.
//!
//! Assim como no modo síncrono, o modo streaming emite eventos em cada passo
//! via um canal (`mpsc`), o que permite ao servidor WebSocket mostrar cada
//! regra sendo aplicada.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compiler::{RuleSet, RuleSummary};
use crate::config::{InputFormat, RetagConfig};
use crate::error::{Result, RetagError};
use crate::record::{TaggedSentence, TokenRecord};
use crate::rewriter::{LineRewriter, RewriteStep};
use crate::table::CorrespondenceTable;
use crate::toolkit::{ConllReader, Tagger};

/// Eventos emitidos durante a reescrita.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: regras disponíveis para esta execução.
    RulesCompiled { rules: Vec<RuleSummary> },
    /// **Passo 2 (por regra)**: uma regra alterou a unidade `line_index`.
    RuleApplied {
        line_index: usize,
        step: RewriteStep,
    },
    /// **Passo 3 (por unidade)**: resultado final de uma linha/registro.
    LineRewritten {
        line_index: usize,
        input: String,
        output: String,
    },
    /// **Conclusão**: texto completo reescrito.
    Done {
        output: String,
        total_lines: usize,
        changed_lines: usize,
        processing_ms: u64,
    },
    /// **Falha**: entrada inválida (ex: registro em colunas malformado).
    Error { message: String },
}

/// Resultado de uma reescrita em memória.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rewritten {
    pub output: String,
    /// Unidades processadas (linhas ou registros + separadores de sentença).
    pub lines: usize,
    pub changed_lines: usize,
}

/// Resumo de uma execução arquivo → arquivo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub lines: usize,
    pub changed_lines: usize,
    pub rules: usize,
    pub processing_ms: u64,
}

/// Unidade de reescrita.
#[derive(Debug, Clone)]
enum Unit {
    Line(String),
    Record(TokenRecord),
    SentenceBreak,
}

impl Unit {
    fn input(&self) -> Cow<'_, str> {
        match self {
            Unit::Line(line) => Cow::Borrowed(line.as_str()),
            Unit::Record(record) => Cow::Owned(record.to_line()),
            Unit::SentenceBreak => Cow::Borrowed("\n"),
        }
    }

    fn rewrite(&self, rewriter: &LineRewriter<'_>) -> String {
        match self {
            Unit::Line(line) => rewriter.rewrite(line),
            Unit::Record(record) => record.rewrite(rewriter).to_line(),
            Unit::SentenceBreak => "\n".to_string(),
        }
    }

    fn rewrite_traced(&self, rewriter: &LineRewriter<'_>) -> (String, Vec<RewriteStep>) {
        match self {
            Unit::Line(line) => rewriter.rewrite_traced(line),
            Unit::Record(record) => {
                let (tag, mut steps) = rewriter.rewrite_traced(&record.tag);
                let ner = record.ner.as_deref().map(|ner| {
                    let (ner, ner_steps) = rewriter.rewrite_traced(ner);
                    steps.extend(ner_steps);
                    ner
                });
                let rewritten = TokenRecord {
                    token: record.token.clone(),
                    tag,
                    ner,
                };
                (rewritten.to_line(), steps)
            }
            Unit::SentenceBreak => ("\n".to_string(), Vec::new()),
        }
    }
}

/// O pipeline de reescrita.
///
/// # Modos de Uso
/// - **Sync**: [`rewrite_text`](Self::rewrite_text) e [`run`](Self::run) (arquivo → arquivo).
/// - **Streaming**: [`rewrite_streaming`](Self::rewrite_streaming) para UIs reativas.
/// - **Embutido**: [`rewrite_sentences`](Self::rewrite_sentences) dentro de outro
///   pipeline de etiquetagem.
#[derive(Debug, Clone)]
pub struct RetagPipeline {
    rules: RuleSet,
    format: InputFormat,
    parallel: bool,
}

impl RetagPipeline {
    /// Pipeline sequencial no formato de linhas.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            format: InputFormat::Lines,
            parallel: false,
        }
    }

    pub fn from_table(table: &CorrespondenceTable) -> Result<Self> {
        Ok(Self::new(RuleSet::compile(table)?))
    }

    /// Carrega, une e compila as tabelas descritas pela configuração.
    pub fn from_config(config: &RetagConfig) -> Result<Self> {
        let table = Self::build_table(config)?;
        let rules = RuleSet::compile(&table)?;
        info!(
            "{} regras compiladas a partir de {} etiquetas de origem",
            rules.len(),
            table.source_count()
        );
        Ok(Self::new(rules)
            .with_format(config.format)
            .with_parallel(config.parallel))
    }

    /// Tabela efetiva: tabelas da configuração na ordem + NER embutida (se ativa).
    pub fn build_table(config: &RetagConfig) -> Result<CorrespondenceTable> {
        let mut table = CorrespondenceTable::new();
        for path in &config.tables {
            table.merge(&CorrespondenceTable::load(path)?)?;
        }
        if config.uses_builtin_ner() {
            table.merge(&CorrespondenceTable::conll_ner())?;
        }
        if table.is_empty() {
            warn!("Nenhuma etiqueta carregada: a saída será idêntica à entrada");
        }
        Ok(table)
    }

    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    pub fn rewriter(&self) -> LineRewriter<'_> {
        LineRewriter::new(&self.rules)
    }

    /// Reescreve um texto completo no formato configurado.
    pub fn rewrite_text(&self, text: &str) -> Result<Rewritten> {
        let units = self.split_units(text)?;
        Ok(self.rewrite_units(&units))
    }

    /// Como [`rewrite_text`](Self::rewrite_text), devolvendo também cada regra
    /// que alterou alguma unidade (sempre sequencial).
    pub fn rewrite_text_traced(&self, text: &str) -> Result<(Rewritten, Vec<RewriteStep>)> {
        let units = self.split_units(text)?;
        let rewriter = self.rewriter();
        let mut output = String::with_capacity(text.len());
        let mut steps = Vec::new();
        let mut changed_lines = 0;

        for unit in &units {
            let (rewritten, unit_steps) = unit.rewrite_traced(&rewriter);
            if *unit.input() != rewritten {
                changed_lines += 1;
            }
            steps.extend(unit_steps);
            output.push_str(&rewritten);
        }

        let rewritten = Rewritten {
            output,
            lines: units.len(),
            changed_lines,
        };
        Ok((rewritten, steps))
    }

    /// Etiqueta o documento com um [`Tagger`] externo e reescreve os registros.
    pub fn rewrite_document<T: Tagger + ?Sized>(&self, tagger: &T, text: &str) -> Result<Rewritten> {
        let sentences = tagger.tag_document(text)?;
        Ok(self.rewrite_units(&sentence_units(sentences)))
    }

    /// Reescreve sentenças já etiquetadas, mantendo a estrutura.
    pub fn rewrite_sentences(&self, sentences: &[TaggedSentence]) -> Vec<TaggedSentence> {
        let rewriter = self.rewriter();
        sentences
            .iter()
            .map(|sentence| sentence.iter().map(|r| r.rewrite(&rewriter)).collect())
            .collect()
    }

    /// Executa o pipeline enviando eventos de progresso em tempo real.
    ///
    /// # Fluxo de Eventos
    /// 1. `RulesCompiled`
    /// 2. `RuleApplied` (loop): cada regra que alterou uma unidade
    /// 3. `LineRewritten` (loop): resultado de cada unidade
    /// 4. `Done` (ou `Error`, se a entrada for inválida)
    pub fn rewrite_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();

        let _ = tx.send(PipelineEvent::RulesCompiled {
            rules: self.rules.summaries(),
        });

        let units = match self.split_units(text) {
            Ok(units) => units,
            Err(err) => {
                let _ = tx.send(PipelineEvent::Error {
                    message: err.to_string(),
                });
                return;
            }
        };

        let rewriter = self.rewriter();
        let mut output = String::with_capacity(text.len());
        let mut changed_lines = 0;

        for (line_index, unit) in units.iter().enumerate() {
            let (rewritten, steps) = unit.rewrite_traced(&rewriter);
            for step in steps {
                let _ = tx.send(PipelineEvent::RuleApplied { line_index, step });
            }
            let input = unit.input();
            if *input != rewritten {
                changed_lines += 1;
            }
            let _ = tx.send(PipelineEvent::LineRewritten {
                line_index,
                input: input.into_owned(),
                output: rewritten.clone(),
            });
            output.push_str(&rewritten);
        }

        let _ = tx.send(PipelineEvent::Done {
            output,
            total_lines: units.len(),
            changed_lines,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    /// Lê `source`, reescreve e grava `destination`.
    ///
    /// O destino só é criado depois que toda a entrada foi reescrita: uma
    /// falha de leitura ou de formato não deixa arquivo parcial.
    pub fn run(&self, source: &Path, destination: &Path) -> Result<RunSummary> {
        let start = Instant::now();

        let text = fs::read_to_string(source).map_err(|err| RetagError::InputRead {
            path: source.to_path_buf(),
            source: err,
        })?;
        debug!("Entrada '{}': {} bytes", source.display(), text.len());

        let rewritten = self.rewrite_text(&text).map_err(|err| match err {
            RetagError::RecordFormat { line, record } => RetagError::InputRecord {
                path: source.to_path_buf(),
                line,
                record,
            },
            other => other,
        })?;

        let write_err = |err: std::io::Error| RetagError::OutputWrite {
            path: destination.to_path_buf(),
            source: err,
        };
        let file = File::create(destination).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(rewritten.output.as_bytes())
            .map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        let summary = RunSummary {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            lines: rewritten.lines,
            changed_lines: rewritten.changed_lines,
            rules: self.rules.len(),
            processing_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "'{}' → '{}': {} linhas, {} alteradas em {} ms",
            source.display(),
            destination.display(),
            summary.lines,
            summary.changed_lines,
            summary.processing_ms
        );
        Ok(summary)
    }

    fn split_units(&self, text: &str) -> Result<Vec<Unit>> {
        match self.format {
            InputFormat::Lines => Ok(text
                .split_inclusive('\n')
                .map(|line| Unit::Line(line.to_string()))
                .collect()),
            InputFormat::Conll => Ok(sentence_units(ConllReader.tag_document(text)?)),
        }
    }

    fn rewrite_units(&self, units: &[Unit]) -> Rewritten {
        let rewriter = self.rewriter();
        let outputs: Vec<String> = if self.parallel {
            units.par_iter().map(|u| u.rewrite(&rewriter)).collect()
        } else {
            units.iter().map(|u| u.rewrite(&rewriter)).collect()
        };

        let changed_lines = units
            .iter()
            .zip(&outputs)
            .filter(|(unit, out)| *unit.input() != **out)
            .count();

        Rewritten {
            output: outputs.concat(),
            lines: units.len(),
            changed_lines,
        }
    }
}

/// Achata sentenças em registros, com um separador entre sentenças.
fn sentence_units(sentences: Vec<TaggedSentence>) -> Vec<Unit> {
    let mut units = Vec::new();
    for (i, sentence) in sentences.into_iter().enumerate() {
        if i > 0 {
            units.push(Unit::SentenceBreak);
        }
        units.extend(sentence.into_iter().map(Unit::Record));
    }
    units
}
