//! Contract for the remote advertising-platform adapter.
//!
//! The orchestrator only ever talks to this trait, so tests can substitute
//! a fake adapter without network access. The production implementation is
//! [`crate::google_ads::GoogleAdsClient`].

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{
    AdCopySet, BiddingStrategy, CampaignStatus, ConversionActionConfig, ConversionActionResult,
    CreatedResource, MatchType,
};

/// One keyword to add to an ad group.
#[derive(Debug, Clone)]
pub struct KeywordSpec {
    pub text: String,
    pub match_type: MatchType,
}

/// A keyword the platform reports as created.
#[derive(Debug, Clone)]
pub struct CreatedKeyword {
    pub resource: CreatedResource,
    pub text: String,
}

/// Authenticated create/query operations against the advertising platform.
///
/// Each create returns the platform's resource identifier; callers chain
/// identifiers through the budget → campaign → ad group → keyword/ad
/// sequence. Count and length bounds on ad assets are enforced client-side
/// before any call reaches an implementation.
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// Creates a shared campaign budget from an integer micro-unit amount.
    async fn create_budget(
        &self,
        name: &str,
        amount_micros: i64,
    ) -> Result<CreatedResource, AppError>;

    /// Creates a search campaign referencing an existing budget resource.
    async fn create_campaign(
        &self,
        name: &str,
        status: CampaignStatus,
        budget_resource: &str,
        bidding_strategy: BiddingStrategy,
    ) -> Result<CreatedResource, AppError>;

    /// Creates an ad group under an existing campaign resource.
    async fn create_ad_group(
        &self,
        name: &str,
        campaign_resource: &str,
        cpc_bid_micros: Option<i64>,
        status: CampaignStatus,
    ) -> Result<CreatedResource, AppError>;

    /// Adds a batch of keywords to an existing ad group resource.
    async fn add_keywords(
        &self,
        ad_group_resource: &str,
        keywords: &[KeywordSpec],
    ) -> Result<Vec<CreatedKeyword>, AppError>;

    /// Creates a responsive search ad under an existing ad group resource.
    async fn create_responsive_search_ad(
        &self,
        ad_group_resource: &str,
        copy: &AdCopySet,
        final_url: &str,
    ) -> Result<CreatedResource, AppError>;

    /// Finds or creates a conversion action by name and recovers its
    /// tracking label from the returned tag snippets. A missing label is
    /// reported as an empty string, never as an error.
    async fn ensure_conversion_action(
        &self,
        config: &ConversionActionConfig,
    ) -> Result<ConversionActionResult, AppError>;
}
