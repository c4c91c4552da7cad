//! Top-level provisioning driver.
//!
//! Consumes parsed definitions and drives the budget → campaign →
//! ad group → keywords → ad creation sequence against the injected
//! [`AdsApi`] adapter, mirroring every created resource through the
//! injected [`Mirror`] sink immediately after its remote create succeeds.
//!
//! Failure isolation:
//! - budget or campaign creation failure is fatal for that campaign only;
//!   the batch continues with the next campaign
//! - ad-group, keyword-batch, and ad failures are warnings; sibling steps
//!   and subsequent ad groups still proceed
//!
//! Outcomes are carried as values in [`BatchResult`]; logging is a
//! projection of the result, never the mechanism for reporting it.

use std::collections::HashSet;

use crate::ads_api::{AdsApi, KeywordSpec};
use crate::definition_parser::ParsedDefinitions;
use crate::errors::AppError;
use crate::mirror::Mirror;
use crate::models::{
    AdGroupDefinition, BatchResult, BiddingStrategy, CampaignDefinition, CampaignOutcome,
    CampaignRunStatus, CampaignStatus, ConversionActionConfig, ConversionActionResult,
    KeywordDefinition, ProvisionCounts, to_micros,
};

/// Default CPC bid for manual-CPC ad groups, in whole currency units.
const DEFAULT_CPC_BID: f64 = 2.0;

pub struct Provisioner<A: AdsApi, M: Mirror> {
    api: A,
    mirror: M,
}

impl<A: AdsApi, M: Mirror> Provisioner<A, M> {
    pub fn new(api: A, mirror: M) -> Self {
        Self { api, mirror }
    }

    /// Provisions every campaign in the batch, strictly sequentially.
    ///
    /// Duplicate campaign names within one definition are rejected up
    /// front rather than relying on platform behavior.
    pub async fn provision_all(
        &self,
        definitions: &ParsedDefinitions,
    ) -> Result<BatchResult, AppError> {
        let mut seen = HashSet::new();
        for campaign in &definitions.campaigns {
            if !seen.insert(campaign.name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate campaign name in definition: {}",
                    campaign.name
                )));
            }
        }

        let mut result = BatchResult::default();
        for campaign in &definitions.campaigns {
            let outcome = self.provision_campaign(campaign, definitions).await;
            match &outcome.status {
                CampaignRunStatus::Succeeded => {
                    tracing::info!(
                        "Campaign provisioned: {} ({}/{} ad groups, {}/{} keywords, {}/{} ads)",
                        outcome.campaign_name,
                        outcome.counts.ad_groups_created,
                        outcome.counts.ad_groups_attempted,
                        outcome.counts.keywords_created,
                        outcome.counts.keywords_attempted,
                        outcome.counts.ads_created,
                        outcome.counts.ads_attempted,
                    );
                }
                CampaignRunStatus::Failed(reason) => {
                    tracing::error!("Campaign failed: {}: {}", outcome.campaign_name, reason);
                }
            }
            result.outcomes.push(outcome);
        }

        Ok(result)
    }

    /// Runs the per-campaign creation sequence. Never returns an error:
    /// campaign-fatal failures become a `Failed` outcome so the batch can
    /// move on.
    async fn provision_campaign(
        &self,
        campaign: &CampaignDefinition,
        definitions: &ParsedDefinitions,
    ) -> CampaignOutcome {
        let mut counts = ProvisionCounts::default();

        // Budget and campaign creation are fatal for this campaign
        let budget_name = format!("{} - Budget", campaign.name);
        let budget = match self
            .api
            .create_budget(&budget_name, to_micros(campaign.daily_budget))
            .await
        {
            Ok(resource) => resource,
            Err(e) => return failed(campaign, counts, format!("budget creation failed: {}", e)),
        };

        // New campaigns always start paused; activation is an explicit
        // operator decision after review.
        let campaign_resource = match self
            .api
            .create_campaign(
                &campaign.name,
                CampaignStatus::Paused,
                &budget.resource_name,
                campaign.bidding_strategy,
            )
            .await
        {
            Ok(resource) => resource,
            Err(e) => return failed(campaign, counts, format!("campaign creation failed: {}", e)),
        };

        let campaign_row_id = match self.mirror.record_campaign(campaign, &campaign_resource).await
        {
            Ok(row_id) => row_id,
            Err(e) => return failed(campaign, counts, format!("campaign mirror failed: {}", e)),
        };

        let ad_groups: Vec<&AdGroupDefinition> = definitions
            .ad_groups
            .iter()
            .filter(|g| g.campaign_name == campaign.name)
            .collect();

        for group in ad_groups {
            counts.ad_groups_attempted += 1;
            self.provision_ad_group(
                campaign,
                campaign_row_id,
                &campaign_resource.resource_name,
                group,
                definitions,
                &mut counts,
            )
            .await;
        }

        CampaignOutcome {
            campaign_name: campaign.name.clone(),
            status: CampaignRunStatus::Succeeded,
            counts,
        }
    }

    /// Processes one ad group. Every failure in here is a warning: the
    /// remaining steps of this ad group and its siblings still run.
    async fn provision_ad_group(
        &self,
        campaign: &CampaignDefinition,
        campaign_row_id: i64,
        campaign_resource: &str,
        group: &AdGroupDefinition,
        definitions: &ParsedDefinitions,
        counts: &mut ProvisionCounts,
    ) {
        let cpc_bid = match campaign.bidding_strategy {
            BiddingStrategy::ManualCpc => Some(to_micros(DEFAULT_CPC_BID)),
            _ => None,
        };

        let group_resource = match self
            .api
            .create_ad_group(&group.name, campaign_resource, cpc_bid, CampaignStatus::Paused)
            .await
        {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!("Ad group creation failed for {}: {}", group.name, e);
                return;
            }
        };
        counts.ad_groups_created += 1;

        // Mirror failure does not stop the remote sequence; children are
        // simply not mirrored without an owning row.
        let group_row_id = match self
            .mirror
            .record_ad_group(campaign_row_id, group, &group_resource)
            .await
        {
            Ok(row_id) => Some(row_id),
            Err(e) => {
                tracing::warn!("Ad group mirror failed for {}: {}", group.name, e);
                None
            }
        };

        let keywords: Vec<&KeywordDefinition> = definitions
            .keywords
            .iter()
            .filter(|k| k.campaign_name == campaign.name && k.ad_group_name == group.name)
            .collect();

        if !keywords.is_empty() {
            counts.keywords_attempted += keywords.len();
            let specs: Vec<KeywordSpec> = keywords
                .iter()
                .map(|k| KeywordSpec {
                    text: k.text.clone(),
                    match_type: k.match_type,
                })
                .collect();

            match self
                .api
                .add_keywords(&group_resource.resource_name, &specs)
                .await
            {
                Ok(created) => {
                    counts.keywords_created += created.len();
                    if let Some(row_id) = group_row_id {
                        for (kw, definition) in created.iter().zip(keywords.iter().copied()) {
                            if let Err(e) =
                                self.mirror.record_keyword(row_id, definition, &kw.resource).await
                            {
                                tracing::warn!("Keyword mirror failed for {}: {}", kw.text, e);
                            }
                        }
                    }
                }
                Err(e) => {
                    // Ad creation is still attempted below
                    tracing::warn!("Keyword batch failed for {}: {}", group.name, e);
                }
            }
        }

        counts.ads_attempted += 1;
        let copy = crate::ad_copy::generate(campaign.kind, &group.name, &group.final_url);
        match self
            .api
            .create_responsive_search_ad(&group_resource.resource_name, &copy, &group.final_url)
            .await
        {
            Ok(ad_resource) => {
                counts.ads_created += 1;
                if let Some(row_id) = group_row_id {
                    if let Err(e) = self
                        .mirror
                        .record_ad(row_id, &ad_resource, &group.final_url)
                        .await
                    {
                        tracing::warn!("Ad mirror failed for {}: {}", group.name, e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Ad creation failed for {}: {}", group.name, e);
            }
        }
    }

    /// Finds or creates the lead-tracking conversion action for the
    /// account. Called once per run, before the campaign loop.
    pub async fn ensure_conversion_tracking(
        &self,
    ) -> Result<ConversionActionResult, AppError> {
        let config = ConversionActionConfig::lead_form_default();
        let result = self.api.ensure_conversion_action(&config).await?;
        if result.label.is_empty() {
            tracing::warn!(
                "Conversion action {} created without a recoverable label",
                result.name
            );
        } else {
            tracing::info!(
                "Conversion tracking ready: {} (label {})",
                result.name,
                result.label
            );
        }
        Ok(result)
    }
}

fn failed(
    campaign: &CampaignDefinition,
    counts: ProvisionCounts,
    reason: String,
) -> CampaignOutcome {
    CampaignOutcome {
        campaign_name: campaign.name.clone(),
        status: CampaignRunStatus::Failed(reason),
        counts,
    }
}
