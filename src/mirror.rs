//! Local persistence mirror for remotely created resources.
//!
//! Every successful remote create is echoed here immediately, before the
//! next step runs, so a mid-run crash leaves a consistent prefix of
//! mirrored state. The sink is insert-only; rows are never mutated.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};
use crate::models::{
    AdGroupDefinition, CampaignDefinition, CreatedResource, KeywordDefinition, to_micros,
};

/// Insert-only sink mirroring created resources. Each record call returns
/// the local row id so child rows can reference their owner.
#[async_trait]
pub trait Mirror: Send + Sync {
    async fn record_campaign(
        &self,
        definition: &CampaignDefinition,
        resource: &CreatedResource,
    ) -> Result<i64, AppError>;

    async fn record_ad_group(
        &self,
        campaign_row_id: i64,
        definition: &AdGroupDefinition,
        resource: &CreatedResource,
    ) -> Result<i64, AppError>;

    async fn record_keyword(
        &self,
        ad_group_row_id: i64,
        definition: &KeywordDefinition,
        resource: &CreatedResource,
    ) -> Result<i64, AppError>;

    async fn record_ad(
        &self,
        ad_group_row_id: i64,
        resource: &CreatedResource,
        final_url: &str,
    ) -> Result<i64, AppError>;
}

/// Postgres-backed mirror.
pub struct PgMirror {
    pool: PgPool,
}

impl PgMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the mirror tables when they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ads_campaigns (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                resource_name TEXT NOT NULL,
                google_id BIGINT NOT NULL,
                daily_budget_micros BIGINT NOT NULL,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ads_campaigns table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ads_ad_groups (
                id BIGSERIAL PRIMARY KEY,
                campaign_id BIGINT NOT NULL REFERENCES ads_campaigns(id),
                name TEXT NOT NULL,
                resource_name TEXT NOT NULL,
                google_id BIGINT NOT NULL,
                final_url TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ads_ad_groups table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ads_keywords (
                id BIGSERIAL PRIMARY KEY,
                ad_group_id BIGINT NOT NULL REFERENCES ads_ad_groups(id),
                text TEXT NOT NULL,
                match_type TEXT NOT NULL,
                resource_name TEXT NOT NULL,
                google_id BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ads_keywords table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ads_ads (
                id BIGSERIAL PRIMARY KEY,
                ad_group_id BIGINT NOT NULL REFERENCES ads_ad_groups(id),
                resource_name TEXT NOT NULL,
                google_id BIGINT NOT NULL,
                final_url TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create ads_ads table")?;

        tracing::info!("Mirror schema ready");
        Ok(())
    }
}

#[async_trait]
impl Mirror for PgMirror {
    async fn record_campaign(
        &self,
        definition: &CampaignDefinition,
        resource: &CreatedResource,
    ) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO ads_campaigns (name, resource_name, google_id, daily_budget_micros, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&definition.name)
        .bind(&resource.resource_name)
        .bind(resource.id)
        .bind(to_micros(definition.daily_budget))
        .bind("PAUSED")
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Mirrored campaign {} as row {}", definition.name, row.0);
        Ok(row.0)
    }

    async fn record_ad_group(
        &self,
        campaign_row_id: i64,
        definition: &AdGroupDefinition,
        resource: &CreatedResource,
    ) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO ads_ad_groups (campaign_id, name, resource_name, google_id, final_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(campaign_row_id)
        .bind(&definition.name)
        .bind(&resource.resource_name)
        .bind(resource.id)
        .bind(&definition.final_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn record_keyword(
        &self,
        ad_group_row_id: i64,
        definition: &KeywordDefinition,
        resource: &CreatedResource,
    ) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO ads_keywords (ad_group_id, text, match_type, resource_name, google_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(ad_group_row_id)
        .bind(&definition.text)
        .bind(definition.match_type.as_str())
        .bind(&resource.resource_name)
        .bind(resource.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn record_ad(
        &self,
        ad_group_row_id: i64,
        resource: &CreatedResource,
        final_url: &str,
    ) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO ads_ads (ad_group_id, resource_name, google_id, final_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(ad_group_row_id)
        .bind(&resource.resource_name)
        .bind(resource.id)
        .bind(final_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
