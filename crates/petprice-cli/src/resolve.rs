//! `resolve` and `resolve-batch` command handlers.
//!
//! The browser-automation layer writes raw search results to JSON; these
//! handlers decide which result (if any) is the target product and upsert the
//! winning price as the current offer for `(product, source)`. Per-job
//! failures in a batch are logged and skipped rather than propagated.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use petprice_arbiter::{
    CandidateResolver, LlmArbiter, OllamaClient, Pacer, Resolution, ResolveTarget, ResolvedMatch,
};
use petprice_core::{AppConfig, RawCandidate};
use petprice_db::NewOffer;
use serde::{Deserialize, Serialize};

/// One scrape result set for one product at one source.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResolveJob {
    pub product_id: i64,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub weight: Option<String>,
    pub candidates: Vec<RawCandidate>,
}

/// What gets printed for each resolved job.
#[derive(Debug, Serialize)]
pub(crate) struct JobReport<'a> {
    pub product_id: i64,
    pub source: &'a str,
    pub target: &'a str,
    pub resolution: &'a Resolution,
}

pub(crate) fn read_candidates(path: &Path) -> anyhow::Result<Vec<RawCandidate>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read candidates file {}", path.display()))?;
    parse_candidates(&content)
        .with_context(|| format!("failed to parse candidates file {}", path.display()))
}

pub(crate) fn read_jobs(path: &Path) -> anyhow::Result<Vec<ResolveJob>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file {}", path.display()))?;
    parse_jobs(&content).with_context(|| format!("failed to parse batch file {}", path.display()))
}

pub(crate) fn parse_candidates(json: &str) -> Result<Vec<RawCandidate>, serde_json::Error> {
    serde_json::from_str(json)
}

pub(crate) fn parse_jobs(json: &str) -> Result<Vec<ResolveJob>, serde_json::Error> {
    serde_json::from_str(json)
}

fn build_arbiter(config: &AppConfig) -> anyhow::Result<LlmArbiter<OllamaClient>> {
    let client =
        OllamaClient::with_base_url(&config.llm_base_url, &config.llm_model, config.llm_temperature)
            .map_err(|e| anyhow::anyhow!("failed to build model client: {e}"))?;
    Ok(LlmArbiter::new(
        client,
        Duration::from_secs(config.llm_timeout_secs),
    ))
}

/// The offer to store for a match, or `None` when the job has no source.
pub(crate) fn offer_for(job: &ResolveJob, matched: &ResolvedMatch) -> Option<NewOffer> {
    let source_name = job.source.trim();
    if source_name.is_empty() {
        return None;
    }
    Some(NewOffer {
        product_id: job.product_id,
        source_name: source_name.to_string(),
        price: matched.price,
        referral_url: Some(matched.link.clone()),
    })
}

async fn resolve_job(resolver: &CandidateResolver<'_>, job: &ResolveJob) -> Resolution {
    let target = ResolveTarget::new(job.target.clone(), job.weight.clone());
    resolver.resolve(&target, &job.candidates).await
}

fn print_report(job: &ResolveJob, resolution: &Resolution) -> anyhow::Result<()> {
    let report = JobReport {
        product_id: job.product_id,
        source: &job.source,
        target: &job.target,
        resolution,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

/// Writes the match (if any). Returns whether an offer was stored.
async fn persist(
    pool: &sqlx::PgPool,
    job: &ResolveJob,
    resolution: &Resolution,
) -> anyhow::Result<bool> {
    let Some(offer) = resolution.matched().and_then(|m| offer_for(job, m)) else {
        return Ok(false);
    };
    let offer_id = petprice_db::upsert_offer(pool, &offer).await?;
    tracing::info!(
        product_id = job.product_id,
        source = %offer.source_name,
        price = %offer.price,
        offer_id,
        "offer stored"
    );
    Ok(true)
}

/// Resolves one job and stores the matched offer.
///
/// When `dry_run` is `true` the decision is printed and the database is not
/// touched.
///
/// # Errors
///
/// Returns an error if the model client cannot be built, the database is
/// unreachable, or the offer upsert fails.
pub(crate) async fn run_resolve(
    config: &AppConfig,
    job: ResolveJob,
    dry_run: bool,
) -> anyhow::Result<()> {
    let arbiter = build_arbiter(config)?;
    let resolver = CandidateResolver::new(&arbiter);

    let resolution = resolve_job(&resolver, &job).await;
    print_report(&job, &resolution)?;

    if dry_run {
        return Ok(());
    }

    let pool = petprice_db::connect_pool_from_config(config).await?;
    if !persist(&pool, &job, &resolution).await? {
        tracing::info!(
            product_id = job.product_id,
            source = %job.source,
            "no match; offer left unchanged"
        );
    }
    Ok(())
}

/// Resolves every job in order, pausing a random interval between jobs.
///
/// # Errors
///
/// Returns an error if the model client cannot be built or the database is
/// unreachable. Per-job store failures are logged and skipped.
pub(crate) async fn run_resolve_batch(
    config: &AppConfig,
    jobs: Vec<ResolveJob>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let arbiter = build_arbiter(config)?;
    let resolver = CandidateResolver::new(&arbiter);
    let pacer = Pacer::new(config.pacing_min_ms, config.pacing_max_ms);

    let pool = if dry_run {
        None
    } else {
        Some(petprice_db::connect_pool_from_config(config).await?)
    };

    let total = jobs.len();
    let mut matched = 0_usize;
    let mut stored = 0_usize;
    let mut failed = 0_usize;

    for (i, job) in jobs.iter().enumerate() {
        if i > 0 {
            pacer.wait().await;
        }

        let resolution = resolve_job(&resolver, job).await;
        print_report(job, &resolution)?;
        if resolution.matched().is_some() {
            matched += 1;
        }

        let Some(pool) = pool.as_ref() else {
            continue;
        };
        match persist(pool, job, &resolution).await {
            Ok(true) => stored += 1,
            Ok(false) => {}
            Err(e) => {
                failed += 1;
                tracing::error!(
                    product_id = job.product_id,
                    source = %job.source,
                    error = %e,
                    "failed to store offer"
                );
            }
        }
    }

    tracing::info!(total, matched, stored, failed, dry_run, "batch resolution finished");
    Ok(())
}
