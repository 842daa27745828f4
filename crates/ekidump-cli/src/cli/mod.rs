use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod parsers;


use self::parsers::parse_positive_usize;

pub const DEFAULT_DUMP: &str = "enwiki-20210920-pages-articles-multistream.xml.bz2";
pub const DEFAULT_INDEX: &str = "enwiki-20210920-pages-articles-multistream-index.txt.bz2";

#[derive(Debug, Parser)]
#[command(name = "ekidump")]
#[command(
    about = "Extract Japanese railway stations from a Wikipedia multistream dump",
    version
)]
pub struct Cli {
    /// Multistream dump (`*-pages-articles-multistream.xml.bz2`).
    #[arg(short = 'd', long = "dump", global = true, default_value = DEFAULT_DUMP)]
    pub dump: PathBuf,
    /// Offset index of the dump, plain or bzip2-compressed.
    #[arg(short = 'i', long = "index", global = true, default_value = DEFAULT_INDEX)]
    pub index: PathBuf,
    /// Title prefix selecting pages. Overrides `EKIDUMP_TITLE_PREFIX`.
    #[arg(long, global = true)]
    pub prefix: Option<String>,
    /// Number of block workers. Overrides `EKIDUMP_WORKERS`.
    #[arg(long, global = true, value_parser = parse_positive_usize)]
    pub workers: Option<usize>,
    /// Write to this file instead of stdout.
    #[arg(short = 'o', long = "output", global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Station table as TSV (default).
    Stations,
    /// Matching pages as JSON lines.
    Pages {
        /// Select pages by exact title instead of prefix. Repeatable.
        #[arg(long = "title")]
        titles: Vec<String>,
    },
    /// Index directory summary as JSON; the dump is not read.
    Index,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Stations)
    }
}
