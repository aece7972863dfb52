use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsroom::cli::{Cli, Commands};
use newsroom::config::Config;
use newsroom::domain::{Article, ArticleFilter};
use newsroom::services::{
    CollectService, ConnectivityMonitor, FlagService, SyncResult, SyncService, Transition,
};
use newsroom::sources::{HttpFeedTransport, SnapshotFile, TcpReachability};
use newsroom::storage::{ArticleRepository, SqliteArticleRepository, SqliteStorage};

type LiveSyncService = SyncService<SqliteArticleRepository, HttpFeedTransport>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path))?;

    match cli.command {
        Commands::Sync => cmd_sync(&sync_service(&storage, &config), &config),
        Commands::List { filter } => cmd_list(SqliteArticleRepository::new(storage), filter),
        Commands::Read { id } => cmd_toggle_read(SqliteArticleRepository::new(storage), &id),
        Commands::Favorite { id } => {
            cmd_toggle_favorite(SqliteArticleRepository::new(storage), &id)
        }
        Commands::Collect { output } => cmd_collect(&config, output),
        Commands::Import { path } => cmd_import(&sync_service(&storage, &config), &config, path),
        Commands::Profile => cmd_profile(SqliteArticleRepository::new(storage), &config),
        Commands::Watch { interval } => {
            cmd_watch(&sync_service(&storage, &config), &config, interval)
        }
    }
}

fn sync_service(storage: &SqliteStorage, config: &Config) -> LiveSyncService {
    let transport = HttpFeedTransport::new(&config.feed_url, config.http_timeout);
    SyncService::new(SqliteArticleRepository::new(storage.clone()), transport)
}

fn print_result(label: &str, result: &SyncResult) {
    println!(
        "{} complete: {} added, {} skipped",
        label, result.added, result.skipped
    );
    if result.invalid > 0 {
        println!("  ({} items had no guid or link)", result.invalid);
    }
    if result.failed > 0 {
        println!("  ({} items could not be stored)", result.failed);
    }
}

/// Load the offline snapshot into an empty store, if one is available.
fn first_load(service: &LiveSyncService, config: &Config) -> anyhow::Result<()> {
    if service.repository().stats()?.total > 0 {
        return Ok(());
    }

    let file = SnapshotFile::new(&config.snapshot_path);
    if let Some(records) = file.read_if_exists()? {
        let result = service.import_snapshot(records)?;
        print_result("Snapshot load", &result);
    }
    Ok(())
}

fn cmd_sync(service: &LiveSyncService, config: &Config) -> anyhow::Result<()> {
    first_load(service, config)?;

    println!("Fetching {}...\n", config.feed_url);

    match service.sync() {
        Ok(result) => print_result("Sync", &result),
        Err(e) if e.is_transport() => {
            let stored = service.repository().stats()?.total;
            println!("Offline: {}", e);
            println!("{} stored articles are still available.", stored);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn format_article(article: &Article) -> String {
    let read = if article.is_read { "✓" } else { " " };
    let favorite = if article.is_favorite { "♥" } else { " " };
    let date = article
        .published_at
        .map(|d| d.format("%d %b %Y").to_string().to_uppercase())
        .unwrap_or_else(|| "-----------".to_string());

    let mut out = format!("[{}{}] {}  {}", read, favorite, date, article.title);
    if !article.summary.is_empty() {
        out.push_str(&format!("\n      {}", article.summary));
    }
    if !article.link.is_empty() {
        out.push_str(&format!("\n      {}", article.link));
    }
    out.push_str(&format!("\n      id: {}", article.external_id));
    out
}

fn cmd_list(repository: SqliteArticleRepository, filter: ArticleFilter) -> anyhow::Result<()> {
    let articles = repository.list_filtered(filter)?;

    if articles.is_empty() {
        println!("No {} articles.", filter);
        return Ok(());
    }

    for article in &articles {
        println!("{}\n", format_article(article));
    }
    println!("{} articles ({})", articles.len(), filter);

    Ok(())
}

fn cmd_toggle_read(repository: SqliteArticleRepository, id: &str) -> anyhow::Result<()> {
    let service = FlagService::new(repository);
    if service.toggle_read(id)? {
        println!("Marked as read: {}", id);
    } else {
        println!("Marked as unread: {}", id);
    }
    Ok(())
}

fn cmd_toggle_favorite(repository: SqliteArticleRepository, id: &str) -> anyhow::Result<()> {
    let service = FlagService::new(repository);
    if service.toggle_favorite(id)? {
        println!("Added to favorites: {}", id);
    } else {
        println!("Removed from favorites: {}", id);
    }
    Ok(())
}

fn cmd_collect(config: &Config, output: Option<String>) -> anyhow::Result<()> {
    let file = match output {
        Some(path) => SnapshotFile::new(path),
        None => SnapshotFile::new(&config.snapshot_path),
    };
    let service = CollectService::new(HttpFeedTransport::new(
        &config.feed_url,
        config.http_timeout,
    ));

    println!("Collecting {}...", config.feed_url);
    let written = service
        .collect(&file)
        .with_context(|| format!("Collection from {} failed", config.feed_url))?;
    println!("Saved {} articles to {}", written, file.path().display());

    Ok(())
}

fn cmd_import(
    service: &LiveSyncService,
    config: &Config,
    path: Option<String>,
) -> anyhow::Result<()> {
    let file = match path {
        Some(path) => SnapshotFile::new(path),
        None => SnapshotFile::new(&config.snapshot_path),
    };

    let records = match file.read_if_exists()? {
        Some(records) => records,
        None => {
            println!("No snapshot found at {}", file.path().display());
            return Ok(());
        }
    };

    let result = service.import_snapshot(records)?;
    print_result("Import", &result);
    Ok(())
}

fn cmd_profile(repository: SqliteArticleRepository, config: &Config) -> anyhow::Result<()> {
    let profile = &config.profile;
    let stats = repository.stats()?;

    println!("Hello, {}", profile.first_name());
    println!();
    println!("  Name:    {}", profile.name);
    println!("  Subject: {}", profile.subject);
    println!();
    println!("  Read:      {}", stats.read);
    println!("  Favorites: {}", stats.favorites);
    println!("  Stored:    {}", stats.total);

    Ok(())
}

fn cmd_watch(service: &LiveSyncService, config: &Config, interval: u64) -> anyhow::Result<()> {
    let reachability = TcpReachability::for_url(&config.feed_url, config.http_timeout)?;
    let mut monitor = ConnectivityMonitor::new(reachability);

    first_load(service, config)?;

    if monitor.is_online() {
        watch_sync(service);
    } else {
        println!("Offline, waiting for connectivity...");
    }

    loop {
        thread::sleep(Duration::from_secs(interval.max(1)));

        match monitor.poll() {
            Transition::CameOnline => {
                println!("Back online.");
                watch_sync(service);
            }
            Transition::WentOffline => println!("Offline, waiting for connectivity..."),
            Transition::Unchanged => {}
        }
    }
}

fn watch_sync(service: &LiveSyncService) {
    // Failures here are reported and retried on the next reconnect
    match service.sync() {
        Ok(result) => print_result("Sync", &result),
        Err(e) => println!("Sync failed: {}", e),
    }
}
