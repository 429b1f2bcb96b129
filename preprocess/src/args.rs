use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

fn default_input() -> PathBuf {
    PathBuf::from("data/raw/trainset/search.train.json")
}

fn default_output() -> PathBuf {
    PathBuf::from("data/preprocessed/trainset/search.train.json")
}

/// Path value standing for stdin/stdout.
pub const STDIO_PATH: &str = "-";

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Label fake answer spans in a segmented DuReader corpus",
    long_about = "Label fake answer spans in a segmented DuReader corpus.\n\n\
        Records are written in completion order, which only matches the input \
        order with a single worker unless --ordered is given."
)]
pub struct Config {
    /// Segmented DuReader corpus, one JSON sample per line ("-" reads stdin)
    #[arg(default_value_os_t = default_input())]
    pub input: PathBuf,

    /// Preprocessed corpus; appended to when it already exists ("-" writes stdout)
    #[arg(default_value_os_t = default_output())]
    pub output: PathBuf,

    /// Number of concurrent mining workers (defaults to the CPU count)
    #[arg(long, short = 'w')]
    pub max_workers: Option<usize>,

    /// Write records in input order regardless of the worker count
    #[arg(long)]
    pub ordered: bool,

    /// Number of leading paragraph tokens searched for answer spans
    #[arg(long)]
    pub span_window: Option<usize>,

    /// Rank paragraphs against the question for samples without gold answers
    #[arg(long)]
    pub question_fallback: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Settings file (defaults to ./preprocess.{toml,yaml,json} when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    pub fn finalize(&mut self) -> Result<()> {
        if self.max_workers == Some(0) {
            return Err(anyhow!("--max-workers must be greater than zero"));
        }
        if self.span_window == Some(0) {
            return Err(anyhow!("--span-window must be greater than zero"));
        }
        if self.input == self.output && !self.reads_stdin() {
            return Err(anyhow!(
                "input and output must differ (both are {})",
                self.input.display()
            ));
        }
        Ok(())
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == STDIO_PATH
    }

    pub fn writes_stdout(&self) -> bool {
        self.output.as_os_str() == STDIO_PATH
    }
}

pub struct ParsedArgs {
    pub config: Config,
}

pub fn parse() -> Result<ParsedArgs> {
    let mut config = Config::parse();
    config.finalize()?;
    Ok(ParsedArgs { config })
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating parent directory for {}", path.display()))?;
    }
    Ok(())
}

/// Open `path` for appending, creating it and its parent directories first.
pub fn open_append(path: &Path) -> Result<File> {
    ensure_parent(path)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening output corpus {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> Result<Config> {
        let mut config = Config::try_parse_from(args)?;
        config.finalize()?;
        Ok(config)
    }

    #[test]
    fn defaults_point_at_the_dureader_layout() {
        let config = parse_from(&["dureader-preprocess"]).expect("parse");
        assert_eq!(config.input, default_input());
        assert_eq!(config.output, default_output());
        assert_eq!(config.max_workers, None);
        assert!(!config.ordered);
        assert!(!config.reads_stdin());
    }

    #[test]
    fn positional_paths_and_worker_flag() {
        let config = parse_from(&["dureader-preprocess", "-w", "4", "-", "out.json"]).expect("parse");
        assert_eq!(config.max_workers, Some(4));
        assert!(config.reads_stdin());
        assert!(!config.writes_stdout());
        assert_eq!(config.output, PathBuf::from("out.json"));
    }

    #[test]
    fn rejects_zero_workers_and_window() {
        assert!(parse_from(&["dureader-preprocess", "--max-workers", "0"]).is_err());
        assert!(parse_from(&["dureader-preprocess", "--span-window", "0"]).is_err());
    }

    #[test]
    fn rejects_writing_over_the_input() {
        assert!(parse_from(&["dureader-preprocess", "a.json", "a.json"]).is_err());
        assert!(parse_from(&["dureader-preprocess", "-", "-"]).is_ok());
    }
}
