//! `retag`: converte um arquivo etiquetado para o esquema universal.
//!
//! ```text
//! retag POSTags_PTB_Universal.txt entrada.txt saida.txt
//! retag --format conll POSTags_PTB_Universal.txt wsj_0010.conll wsj_0010.universal
//! ```

use anyhow::Result;
use clap::Parser;
use retag_core::{RetagConfig, RetagPipeline};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

mod cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("Erro: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => RetagConfig::load(path)?,
        None => RetagConfig::default(),
    };
    let config = cli.apply_to(base);
    debug!("Configuração efetiva: {}", serde_json::to_string(&config)?);

    let pipeline = RetagPipeline::from_config(&config)?;
    let summary = pipeline.run(&cli.source, &cli.destination)?;

    println!(
        "{} linhas processadas, {} alteradas ({} regras)",
        summary.lines, summary.changed_lines, summary.rules
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
