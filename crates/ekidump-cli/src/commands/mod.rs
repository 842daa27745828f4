use std::io::Write;

use anyhow::{Context, Result};
use ekidump_core::{EkiError, ExtractConfig, Extraction, TitleSelector, write_tsv};
use tracing::error;

use crate::cli::{Cli, Commands};

mod output;


use self::output::{open_output, write_json_lines, write_pretty_json};

pub(crate) fn run(cli: Cli) -> Result<()> {
    let config = ExtractConfig::from_env()
        .context("invalid environment configuration")?
        .with_workers(cli.workers)
        .with_title_prefix(cli.prefix.clone());
    let extraction = Extraction::new(config).context("invalid configuration")?;

    // the output is created only once the extract is complete
    let output = cli.output.as_deref();
    match cli.command() {
        Commands::Stations => {
            let stations = stage(
                "extract stations",
                extraction.stations(&cli.dump, &cli.index),
            )?;
            let mut out = open_output(output)?;
            stage("write TSV", write_tsv(&mut *out, &stations))?;
            out.flush().context("failed to flush output")?;
        }
        Commands::Pages { titles } => {
            let documents = if titles.is_empty() {
                stage("extract pages", extraction.run(&cli.dump, &cli.index))?
            } else {
                let selector = TitleSelector::exact(&titles);
                stage("extract pages", extraction.run_with(&cli.dump, &cli.index, &selector))?
            };
            let mut out = open_output(output)?;
            write_json_lines(&mut *out, &documents)?;
            out.flush().context("failed to flush output")?;
        }
        Commands::Index => {
            let directory = stage("build index", extraction.build_directory(&cli.index))?;
            let mut out = open_output(output)?;
            write_pretty_json(&mut *out, &directory.summary())?;
            out.flush().context("failed to flush output")?;
        }
    }
    Ok(())
}

fn stage<T>(label: &'static str, result: ekidump_core::Result<T>) -> Result<T> {
    result.map_err(|err: EkiError| {
        error!(code = err.code(), stage = label, "{err}");
        anyhow::Error::new(err).context(format!("failed to {label}"))
    })
}
