//! Catalog Announcer CLI
//!
//! Entry point for the CI action: announces catalog additions and checks
//! catalog links.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use announcer::{
    error::Result,
    models::Config,
    pipeline::{self, AnnounceRequest, Publishers},
    publish::{BlueskyClient, BlueskyCredentials, TwitterClient, TwitterCredentials},
    utils::http::{self, HttpFetcher},
    vcs::GitCli,
};
use clap::{Parser, Subcommand};

/// Announce new catalog entries on X/Twitter and Bluesky
#[derive(Parser, Debug)]
#[command(name = "announcer", version, about = "Curated list announcer")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "announcer.toml")]
    config: PathBuf,

    /// Repository working directory
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Post the catalog entries added by a commit
    Announce {
        /// Commit to announce
        #[arg(long, env = "GITHUB_SHA")]
        commit_hash: String,

        /// Phrase the commit message must contain for anything to be posted
        #[arg(long, env = "INPUT_TRIGGER_KEYWORD")]
        trigger_keyword: String,

        /// Compose and resolve previews without publishing
        #[arg(long)]
        dry_run: bool,
    },

    /// Check catalog links for redirects and errors
    CheckLinks {
        /// Catalog file (default: the configured catalog path)
        catalog: Option<PathBuf>,

        /// Fail when redirects are found, not only on errors
        #[arg(long)]
        fail_on_redirect: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.command {
        Command::Validate => Config::load_validated(&cli.config)?,
        _ => {
            let config = Config::load_or_default(&cli.config);
            config.validate()?;
            config
        }
    };

    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);

    match cli.command {
        Command::Announce {
            commit_hash,
            trigger_keyword,
            dry_run,
        } => {
            log::info!("Commit: {}", commit_hash);
            log::info!("Trigger: {}", trigger_keyword);

            let publishers = if dry_run {
                log::info!("Dry run");
                None
            } else {
                // Both credential sets are required before anything is posted.
                let client = http::create_async_client(&config.http)?;
                Some(Publishers {
                    twitter: Box::new(TwitterClient::new(
                        client.clone(),
                        &config.twitter,
                        TwitterCredentials::from_env()?,
                    )),
                    bluesky: Box::new(BlueskyClient::new(
                        client,
                        &config.bluesky,
                        BlueskyCredentials::from_env()?,
                    )),
                })
            };

            let source = GitCli::new(&cli.repo);
            let request = AnnounceRequest {
                commit: commit_hash,
                trigger: trigger_keyword,
            };
            let outcome =
                pipeline::run_announce(&config, &source, fetcher, publishers.as_ref(), &request)
                    .await?;

            if outcome.skipped {
                log::info!("Trigger keyword not found, exiting");
            } else {
                log::info!("Announced {} entries", outcome.announced.len());
            }
        }

        Command::CheckLinks {
            catalog,
            fail_on_redirect,
        } => {
            let catalog = catalog.unwrap_or_else(|| cli.repo.join(&config.catalog.path));
            let step_summary = std::env::var_os("GITHUB_STEP_SUMMARY").map(PathBuf::from);

            let report =
                pipeline::run_link_check(&config.links, fetcher, &catalog, step_summary.as_deref())
                    .await?;

            if report.should_fail(fail_on_redirect) {
                log::error!("Link check failed");
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Validate => {
            log::info!("Configuration OK: {}", cli.config.display());
            log::info!("Catalog: {}", config.catalog.path);
            log::info!("Hashtag rules: {}", config.hashtags.len());
        }
    }

    log::info!("Done!");

    Ok(ExitCode::SUCCESS)
}
