use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use wallsync::{build_source, prefetch, Config, HttpDownloader, Target};

#[derive(Parser)]
#[command(name = "fetch-wall")]
#[command(about = "Fetch new posts from a VK wall as normalized publications")]
struct Args {
    /// Number of hours to look back for posts
    #[arg(long, default_value = "24", conflicts_with = "since")]
    hours: i64,

    /// Only posts newer than this Unix timestamp
    #[arg(long)]
    since: Option<i64>,

    /// Wall to read (screen name or owner id), overrides VK_TARGET
    #[arg(short, long, allow_hyphen_values = true)]
    target: Option<String>,

    /// Download every attachment before printing
    #[arg(short, long)]
    download: bool,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

fn cutoff(args: &Args, now: DateTime<Utc>) -> i64 {
    args.since
        .unwrap_or_else(|| (now - Duration::hours(args.hours)).timestamp())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    if let Some(target) = &args.target {
        config.vk_target = target
            .parse::<Target>()
            .with_context(|| format!("Invalid target: {}", target))?;
    }

    let after = cutoff(&args, Utc::now());

    eprintln!("📚 Resolving wall {:?}...", config.vk_target);
    let source = build_source(config.source_config())
        .await
        .context("Failed to set up VK source")?;

    let publications = source
        .fetch_since(after)
        .await
        .context("Failed to fetch posts")?;

    if publications.is_empty() {
        eprintln!("No posts newer than {}.", after);
    } else {
        eprintln!("✓ Found {} posts", publications.len());
    }

    if args.download && !publications.is_empty() {
        eprintln!("\n🌐 Downloading attachments...");
        let downloader = HttpDownloader::new(config.download_timeout)?;
        let results = prefetch(&publications, &downloader, config.download_concurrency).await;

        let failed: Vec<_> = results.iter().filter(|(_, outcome)| outcome.is_err()).collect();
        eprintln!(
            "✓ Downloaded {}/{} attachments",
            results.len() - failed.len(),
            results.len()
        );
        for (link, outcome) in failed {
            if let Err(e) = outcome {
                eprintln!("  ✗ {}: {}", link, e);
            }
        }
    }

    let json = if args.compact {
        serde_json::to_string(&publications)
    } else {
        serde_json::to_string_pretty(&publications)
    }
    .context("Failed to serialize publications")?;

    println!("{}", json);

    Ok(())
}
