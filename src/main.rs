use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use keyfind::{KeyfindConfig, SearchError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keyfind", about = "Search configuration key names with a regular expression")]
struct Cli {
    /// Regular expression, matched anywhere in each key name.
    pattern: String,

    /// Mount configuration (YAML). Without it only the empty default backend is searched.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only search below this key.
    #[arg(short, long, default_value = keyfind::ROOT_PATH)]
    root: String,

    /// Print the matches as one JSON array.
    #[arg(long)]
    json: bool,

    /// Debug logs on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("keyfind: {err:#}");
            let bad_pattern = err
                .downcast_ref::<SearchError>()
                .is_some_and(SearchError::is_client_error);
            if bad_pattern {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => KeyfindConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => KeyfindConfig::default(),
    };
    let kdb = config.open_kdb()?;
    tracing::debug!(mounts = kdb.mount_count(), root = %cli.root, "kdb_opened");

    let matches = config.key_search().find(&cli.pattern, &cli.root, &kdb)?;

    if cli.json {
        println!("{}", serde_json::to_string(&matches)?);
    } else {
        for name in &matches {
            println!("{name}");
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}
