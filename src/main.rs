//! ghcloner: clones the GitHub repositories of users and organizations
//! automatically, mirroring each one to local disk with a bounded pool of
//! concurrent workers. Re-running over the same output directory pulls
//! instead of re-cloning.

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::sync::Arc;
use tokio::sync::watch;

use github_cloner::bulk::{sync_all, BulkSyncOptions};
use github_cloner::config::{parse_name_list, Credentials, RunConfig, DEFAULT_THREADS_LIMIT};
use github_cloner::github::{discover_urls, GithubClient};
use github_cloner::naming::NamingPolicy;
use github_cloner::sync::DiagnosticSink;

fn build_cli() -> ClapCommand {
    ClapCommand::new("ghcloner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Clones public GitHub repositories of users and organizations automatically")
        .arg(
            Arg::new("users")
                .short('u')
                .long("user")
                .value_name("LIST")
                .help("GitHub user (comma-separated input for multiple GitHub users)"),
        )
        .arg(
            Arg::new("organizations")
                .long("org")
                .value_name("LIST")
                .help("GitHub organization (comma-separated input for multiple GitHub organizations)"),
        )
        .arg(
            Arg::new("output-path")
                .short('o')
                .long("output-path")
                .value_name("DIR")
                .help("The directory to use in cloning Git repositories"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .default_value("5")
                .help("Threads used in cloning repositories (default: 5)"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("USERNAME:TOKEN")
                .help("GitHub credentials as username:token, used for the API and for cloning"),
        )
        .arg(
            Arg::new("include-org-members")
                .long("include-org-members")
                .action(ArgAction::SetTrue)
                .help("Include the repositories of a GitHub organization's members"),
        )
        .arg(
            Arg::new("include-authenticated-repos")
                .long("include-authenticated-repos")
                .action(ArgAction::SetTrue)
                .help("Include the repositories of the authenticated user (requires --token)"),
        )
        .arg(
            Arg::new("include-gists")
                .long("include-gists")
                .action(ArgAction::SetTrue)
                .help("Include users' gists"),
        )
        .arg(
            Arg::new("echo-urls")
                .long("echo-urls")
                .action(ArgAction::SetTrue)
                .help("Print discovered repository URLs instead of cloning them"),
        )
        .arg(
            Arg::new("prefix-mode")
                .long("prefix-mode")
                .value_name("MODE")
                .default_value("underscore")
                .help("Local naming policy: none, underscore, or directory"),
        )
}

/// Assembles and validates the run configuration from parsed CLI arguments
fn config_from_matches(matches: &ArgMatches) -> Result<RunConfig> {
    let users = matches
        .get_one::<String>("users")
        .map(|raw| parse_name_list(raw))
        .unwrap_or_default();
    let organizations = matches
        .get_one::<String>("organizations")
        .map(|raw| parse_name_list(raw))
        .unwrap_or_default();
    let credentials = matches
        .get_one::<String>("token")
        .map(|raw| Credentials::parse(raw))
        .transpose()?;
    let policy: NamingPolicy = matches
        .get_one::<String>("prefix-mode")
        .map(String::as_str)
        .unwrap_or("underscore")
        .parse()?;

    let config = RunConfig {
        users,
        organizations,
        output_path: matches.get_one::<String>("output-path").map(Into::into),
        threads_limit: matches
            .get_one::<usize>("threads")
            .copied()
            .unwrap_or(DEFAULT_THREADS_LIMIT),
        credentials,
        include_org_members: matches.get_flag("include-org-members"),
        include_authenticated_repos: matches.get_flag("include-authenticated-repos"),
        include_gists: matches.get_flag("include-gists"),
        echo_urls: matches.get_flag("echo-urls"),
        policy,
    };

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let config = config_from_matches(&matches)?;
    config.warn_on_thread_limit();

    let client = GithubClient::new(config.credentials.clone())?;
    if config.credentials.is_some() && !client.check_credentials().await? {
        anyhow::bail!("Authentication failed: the provided username:token was rejected");
    }

    let urls: Vec<String> = discover_urls(&client, &config).await.into_iter().collect();

    if config.echo_urls {
        for url in &urls {
            println!("{}", url);
        }
        return Ok(());
    }

    if urls.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    // Validation guarantees the output path is present outside echo mode
    let destination_root = config
        .output_path
        .clone()
        .expect("output path validated at configuration time");

    // Inability to create the destination root is fatal before any job runs
    std::fs::create_dir_all(&destination_root).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create output directory {}: {}",
            destination_root.display(),
            e
        )
    })?;

    let total = urls.len();
    let repo_word = if total == 1 { "repository" } else { "repositories" };
    println!(
        "🔽 Cloning {} {} ({} concurrent)",
        total, repo_word, config.threads_limit
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let options = BulkSyncOptions {
        destination_root,
        credentials: config.credentials.clone(),
        policy: config.policy,
        concurrency: config.threads_limit,
    };
    let sink = Arc::new(DiagnosticSink::stdout());
    let start_time = std::time::Instant::now();

    let interrupted = shutdown_rx.clone();
    let stats = sync_all(urls, options, sink, shutdown_rx).await;

    if *interrupted.borrow() {
        println!("\nKeyboardInterrupt detected. Exiting...");
    }

    println!("{}", stats.generate_summary(start_time.elapsed()));

    let detailed_summary = stats.generate_detailed_summary();
    if !detailed_summary.is_empty() {
        println!("\n{}", "━".repeat(70));
        println!("{}", detailed_summary);
        println!("{}", "━".repeat(70));
    }

    Ok(())
}
