//! `testbed harvest`: run every selected category and write the snapshot.
//!
//! Fetch and enrichment failures are absorbed by the harvester and only show
//! up in the run summary. A snapshot that cannot be written fails the command.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use testbed_core::{load_categories, AppConfig, Category};
use testbed_stackex::{
    HarvestSummary, Harvester, RateLimits, RetryPolicy, StackExchangeClient,
};
use testbed_store::{write_snapshot, SNAPSHOT_SOURCE};
use tokio_util::sync::CancellationToken;

use crate::HarvestArgs;

pub(crate) fn rate_limits(config: &AppConfig) -> RateLimits {
    RateLimits {
        inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
        category_delay: Duration::from_millis(config.category_delay_ms),
        quota_low_water: i64::from(config.quota_low_water),
        quota_cooldown: Duration::from_secs(config.quota_cooldown_secs),
    }
}

pub(crate) fn retry_policy(config: &AppConfig) -> RetryPolicy {
    RetryPolicy {
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
    }
}

/// Keeps the categories named in `only`, in file order. An empty filter keeps
/// everything; an unknown name is an error.
pub(crate) fn select_categories(
    categories: Vec<Category>,
    only: &[String],
) -> anyhow::Result<Vec<Category>> {
    if only.is_empty() {
        return Ok(categories);
    }
    let unknown: Vec<&str> = only
        .iter()
        .filter(|name| !categories.iter().any(|c| &c.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        let known: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        anyhow::bail!(
            "unknown categories: {} (configured: {})",
            unknown.join(", "),
            known.join(", ")
        );
    }
    Ok(categories
        .into_iter()
        .filter(|c| only.contains(&c.name))
        .collect())
}

/// Cancels `cancel` on Ctrl-C or once `deadline` elapses, whichever comes
/// first. Exits quietly if the token is cancelled elsewhere.
pub(crate) fn spawn_cancel_watch(
    cancel: CancellationToken,
    deadline: Option<Duration>,
) -> tokio::task::JoinHandle<()> {
    spawn_cancel_watch_on(cancel, deadline, ctrl_c())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; only the deadline applies");
        std::future::pending::<()>().await;
    }
}

fn spawn_cancel_watch_on<S>(
    cancel: CancellationToken,
    deadline: Option<Duration>,
    signal: S,
) -> tokio::task::JoinHandle<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let deadline_hit = async {
            match deadline {
                Some(after) => tokio::time::sleep(after).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            () = cancel.cancelled() => return,
            () = signal => tracing::warn!("interrupted, finishing with partial results"),
            () = deadline_hit => tracing::warn!(
                deadline_secs = deadline.map_or(0, |d| d.as_secs()),
                "deadline reached, finishing with partial results"
            ),
        }
        cancel.cancel();
    })
}

pub(crate) async fn run_harvest(config: &AppConfig, args: HarvestArgs) -> anyhow::Result<()> {
    let categories_path = args
        .categories
        .unwrap_or_else(|| config.categories_path.clone());
    let output = args.output.unwrap_or_else(|| config.snapshot_path.clone());

    let categories = load_categories(&categories_path).map_err(|e| {
        anyhow::anyhow!(
            "failed to load categories from {}: {e}",
            categories_path.display()
        )
    })?;
    let categories = select_categories(categories, &args.only)?;

    if args.dry_run {
        println!(
            "dry-run: would harvest {} categories into {}",
            categories.len(),
            output.display()
        );
        for category in &categories {
            println!(
                "  {} tagged={} count={}",
                category.name,
                category.filter.tagged(),
                category.count
            );
        }
        return Ok(());
    }

    let client = StackExchangeClient::with_base_url(
        &config.stackex_site,
        config.stackex_api_key.as_deref(),
        config.request_timeout_secs,
        &config.user_agent,
        &config.stackex_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build Stack Exchange client: {e}"))?;
    if config.stackex_api_key.is_none() {
        tracing::info!("no STACKEX_API_KEY set, using the anonymous quota");
    }

    let harvester = Harvester::new(client, rate_limits(config), retry_policy(config))
        .with_enrich_concurrency(config.enrich_concurrency);

    let cancel = CancellationToken::new();
    let watch = spawn_cancel_watch(
        cancel.clone(),
        args.deadline_secs.map(Duration::from_secs),
    );

    tracing::info!(
        categories = categories.len(),
        site = %config.stackex_site,
        output = %output.display(),
        "starting harvest"
    );
    let report = harvester.run(&categories, &cancel).await;
    watch.abort();

    let cancelled = report.cancelled;
    let per_category = report.per_category.clone();
    let summary = report.summary;
    let snapshot = report.into_snapshot(SNAPSHOT_SOURCE);

    write_snapshot(&output, &snapshot)
        .map_err(|e| anyhow::anyhow!("failed to write snapshot: {e}"))?;

    print_report(&output, snapshot.count, &per_category, &summary, cancelled);
    Ok(())
}

fn print_report(
    output: &Path,
    count: usize,
    per_category: &[(String, usize)],
    summary: &HarvestSummary,
    cancelled: bool,
) {
    if cancelled {
        println!("harvest stopped early; snapshot holds partial results");
    }
    println!("saved {count} questions to {}", output.display());
    println!("category distribution:");
    for (name, kept) in per_category {
        println!("  {name}: {kept}");
    }
    println!(
        "pages={} answers_attached={} absorbed_errors={} cooldowns={} retries={}",
        summary.pages_fetched,
        summary.answers_attached,
        summary.absorbed_errors(),
        summary.cooldowns,
        summary.retries
    );
}

#[cfg(test)]
#[path = "harvest_test.rs"]
mod tests;
