use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use gerrit_cherry_core::{
    load_ignore_list, read_ignore_file, Cherry, CommitRecord, CommitSource, GitLogSource,
    IgnoreEntry, RefRules, Repository, DEFAULT_HEAD,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "gerrit-cherry")]
#[command(
    version,
    about = "Show Gerrit changes on a branch that are not yet on HEAD",
    long_about = None
)]
struct Cli {
    /// Branch, tag or commit whose changes are checked against HEAD
    other: String,

    /// Reference branch the changes should have landed on
    #[arg(long, default_value = DEFAULT_HEAD)]
    head: String,

    /// Path inside the repository
    #[arg(short = 'C', long = "repo", default_value = ".")]
    path: PathBuf,

    /// Reference expansion rule, `%s` is the given name (repeatable)
    #[arg(long = "ref-rule", value_name = "RULE")]
    ref_rules: Vec<String>,

    /// Read ignored changes from this file instead of searching for one
    #[arg(long, value_name = "PATH", conflicts_with = "no_ignore")]
    ignore_file: Option<PathBuf>,

    /// Do not read any ignore file
    #[arg(long)]
    no_ignore: bool,

    /// How history is read
    #[arg(long, value_enum, default_value_t = Backend::Libgit2)]
    backend: Backend,

    /// Follow only the first parent of merge commits
    #[arg(long)]
    first_parent: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// More log output on stderr (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    /// Read objects in-process with libgit2
    Libgit2,
    /// Run `git log`
    Git,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// `<ChangeId> <CommitId> <Title>` per line
    Text,
    /// JSON array of records
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let ref_rules = if cli.ref_rules.is_empty() {
        None
    } else {
        Some(RefRules::new(cli.ref_rules.iter().cloned()))
    };

    let records = match cli.backend {
        Backend::Libgit2 => {
            let mut repo = Repository::open(&cli.path)?.first_parent(cli.first_parent);
            if let Some(rules) = ref_rules {
                repo = repo.with_ref_rules(rules);
            }
            find_unmerged(repo, &cli)?
        }
        Backend::Git => {
            let mut source = GitLogSource::new()
                .with_repo_path(&cli.path)
                .first_parent(cli.first_parent);
            if let Some(rules) = ref_rules.or_else(|| source.config_ref_rules()) {
                source = source.with_ref_rules(rules);
            }
            find_unmerged(source, &cli)?
        }
    };

    report(&records, cli.format)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn find_unmerged<S: CommitSource>(source: S, cli: &Cli) -> Result<Vec<CommitRecord>> {
    Cherry::new(source)
        .head(cli.head.as_str())
        .ignores(ignore_entries(cli))
        .run(&cli.other)
        .with_context(|| format!("Cannot compare '{}' against '{}'", cli.other, cli.head))
}

fn ignore_entries(cli: &Cli) -> Vec<IgnoreEntry> {
    if cli.no_ignore {
        Vec::new()
    } else if let Some(path) = &cli.ignore_file {
        read_ignore_file(path)
    } else {
        load_ignore_list(&cli.path)
    }
}

fn report(records: &[CommitRecord], format: Format) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        Format::Text => {
            for record in records {
                writeln!(out, "{} {} {}", record.change_id, record.commit_id, record.title)?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, records)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}
