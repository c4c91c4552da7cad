use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_ads_provisioner::config::Config;
use rust_ads_provisioner::db::Database;
use rust_ads_provisioner::definition_parser;
use rust_ads_provisioner::google_ads::GoogleAdsClient;
use rust_ads_provisioner::mirror::PgMirror;
use rust_ads_provisioner::models::CampaignRunStatus;
use rust_ads_provisioner::orchestrator::Provisioner;

/// Main entry point for the provisioning run.
///
/// Loads configuration, parses the campaign definition file, and drives
/// the batch through the orchestrator. Per-campaign failures are reported
/// in the final summary but do not produce a non-zero exit; only fatal
/// errors (configuration, I/O, database connect, batch validation) do.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_ads_provisioner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; missing credentials abort before any API call
    let config = Config::from_env()?;

    // Read and parse the campaign definition file
    let raw_text = tokio::fs::read_to_string(&config.definition_path)
        .await
        .map_err(|e| {
            anyhow::anyhow!("Cannot read definition file {}: {}", config.definition_path, e)
        })?;
    let definitions = definition_parser::parse(&raw_text);
    tracing::info!(
        "Parsed definitions: {} campaigns, {} ad groups, {} keywords",
        definitions.campaigns.len(),
        definitions.ad_groups.len(),
        definitions.keywords.len()
    );

    // Initialize database connection pool and mirror schema
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");
    let mirror = PgMirror::new(db.pool.clone());
    mirror
        .ensure_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Mirror schema setup failed: {}", e))?;

    let api = GoogleAdsClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Google Ads client setup failed: {}", e))?;

    let provisioner = Provisioner::new(api, mirror);

    // Conversion tracking is best-effort; the batch proceeds without it
    if let Err(e) = provisioner.ensure_conversion_tracking().await {
        tracing::warn!("Conversion tracking setup failed: {}", e);
    }

    let result = provisioner
        .provision_all(&definitions)
        .await
        .map_err(|e| anyhow::anyhow!("Provisioning aborted: {}", e))?;

    // Final summary
    let succeeded = result.succeeded().count();
    let failed = result.failed().count();
    tracing::info!("Run complete: {} succeeded, {} failed", succeeded, failed);
    for outcome in &result.outcomes {
        match &outcome.status {
            CampaignRunStatus::Succeeded => {
                tracing::info!(
                    "  OK  {} ({} ad groups, {} keywords, {} ads)",
                    outcome.campaign_name,
                    outcome.counts.ad_groups_created,
                    outcome.counts.keywords_created,
                    outcome.counts.ads_created
                );
            }
            CampaignRunStatus::Failed(reason) => {
                tracing::error!("  FAIL {}: {}", outcome.campaign_name, reason);
            }
        }
    }

    Ok(())
}
