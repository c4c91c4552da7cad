/// Orchestration tests against a fake adapter and a recording mirror.
/// Exercises the failure-isolation rules without network or database.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rust_ads_provisioner::ads_api::{AdsApi, CreatedKeyword, KeywordSpec};
use rust_ads_provisioner::definition_parser::ParsedDefinitions;
use rust_ads_provisioner::errors::AppError;
use rust_ads_provisioner::mirror::Mirror;
use rust_ads_provisioner::models::{
    AdCopySet, AdGroupDefinition, BiddingStrategy, CampaignDefinition, CampaignKind,
    CampaignRunStatus, CampaignStatus, ConversionActionConfig, ConversionActionResult,
    CreatedResource, KeywordDefinition, MatchType,
};
use rust_ads_provisioner::orchestrator::Provisioner;

/// Fake platform adapter. Failures are programmed per entity name; every
/// call is appended to a shared log for ordering assertions.
#[derive(Clone, Default)]
struct FakeAdsApi {
    fail_budget_for: Arc<HashSet<String>>,
    fail_campaign_for: Arc<HashSet<String>>,
    fail_ad_group_for: Arc<HashSet<String>>,
    fail_keywords_for: Arc<HashSet<String>>,
    fail_ad_for: Arc<HashSet<String>>,
    calls: Arc<Mutex<Vec<String>>>,
    campaign_statuses: Arc<Mutex<Vec<String>>>,
    budget_amounts: Arc<Mutex<Vec<i64>>>,
    group_names: Arc<Mutex<HashMap<String, String>>>,
    next_id: Arc<AtomicI64>,
}

impl FakeAdsApi {
    fn next_resource(&self, kind: &str) -> CreatedResource {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        CreatedResource::from_resource_name(format!("customers/1/{}/{}", kind, id))
    }

    fn log(&self, entry: impl Into<String>) {
        self.calls.lock().unwrap().push(entry.into());
    }
}

#[async_trait]
impl AdsApi for FakeAdsApi {
    async fn create_budget(
        &self,
        name: &str,
        amount_micros: i64,
    ) -> Result<CreatedResource, AppError> {
        self.log(format!("budget:{}", name));
        self.budget_amounts.lock().unwrap().push(amount_micros);
        if self.fail_budget_for.iter().any(|c| name.starts_with(c.as_str())) {
            return Err(AppError::ApiError("budget rejected".to_string()));
        }
        Ok(self.next_resource("campaignBudgets"))
    }

    async fn create_campaign(
        &self,
        name: &str,
        status: CampaignStatus,
        _budget_resource: &str,
        _bidding_strategy: BiddingStrategy,
    ) -> Result<CreatedResource, AppError> {
        self.log(format!("campaign:{}", name));
        self.campaign_statuses
            .lock()
            .unwrap()
            .push(status.as_str().to_string());
        if self.fail_campaign_for.contains(name) {
            return Err(AppError::ApiError("campaign rejected".to_string()));
        }
        Ok(self.next_resource("campaigns"))
    }

    async fn create_ad_group(
        &self,
        name: &str,
        _campaign_resource: &str,
        _cpc_bid_micros: Option<i64>,
        _status: CampaignStatus,
    ) -> Result<CreatedResource, AppError> {
        self.log(format!("ad_group:{}", name));
        if self.fail_ad_group_for.contains(name) {
            return Err(AppError::ApiError("ad group rejected".to_string()));
        }
        let resource = self.next_resource("adGroups");
        self.group_names
            .lock()
            .unwrap()
            .insert(resource.resource_name.clone(), name.to_string());
        Ok(resource)
    }

    async fn add_keywords(
        &self,
        ad_group_resource: &str,
        keywords: &[KeywordSpec],
    ) -> Result<Vec<CreatedKeyword>, AppError> {
        let group = self
            .group_names
            .lock()
            .unwrap()
            .get(ad_group_resource)
            .cloned()
            .unwrap_or_default();
        self.log(format!("keywords:{}", group));
        if self.fail_keywords_for.contains(&group) {
            return Err(AppError::ApiError("keywords rejected".to_string()));
        }
        Ok(keywords
            .iter()
            .map(|kw| CreatedKeyword {
                resource: self.next_resource("adGroupCriteria"),
                text: kw.text.clone(),
            })
            .collect())
    }

    async fn create_responsive_search_ad(
        &self,
        ad_group_resource: &str,
        copy: &AdCopySet,
        _final_url: &str,
    ) -> Result<CreatedResource, AppError> {
        copy.validate()?;
        let group = self
            .group_names
            .lock()
            .unwrap()
            .get(ad_group_resource)
            .cloned()
            .unwrap_or_default();
        self.log(format!("ad:{}", group));
        if self.fail_ad_for.contains(&group) {
            return Err(AppError::ApiError("ad rejected".to_string()));
        }
        Ok(self.next_resource("adGroupAds"))
    }

    async fn ensure_conversion_action(
        &self,
        config: &ConversionActionConfig,
    ) -> Result<ConversionActionResult, AppError> {
        self.log(format!("conversion:{}", config.name));
        Ok(ConversionActionResult {
            resource: self.next_resource("conversionActions"),
            name: config.name.clone(),
            label: "AbCdEf12".to_string(),
        })
    }
}

/// Mirror fake recording every insert in order.
#[derive(Clone, Default)]
struct RecordingMirror {
    events: Arc<Mutex<Vec<String>>>,
    next_row: Arc<AtomicI64>,
}

impl RecordingMirror {
    fn record(&self, entry: impl Into<String>) -> i64 {
        self.events.lock().unwrap().push(entry.into());
        self.next_row.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Mirror for RecordingMirror {
    async fn record_campaign(
        &self,
        definition: &CampaignDefinition,
        _resource: &CreatedResource,
    ) -> Result<i64, AppError> {
        Ok(self.record(format!("mirror_campaign:{}", definition.name)))
    }

    async fn record_ad_group(
        &self,
        _campaign_row_id: i64,
        definition: &AdGroupDefinition,
        _resource: &CreatedResource,
    ) -> Result<i64, AppError> {
        Ok(self.record(format!("mirror_ad_group:{}", definition.name)))
    }

    async fn record_keyword(
        &self,
        _ad_group_row_id: i64,
        definition: &KeywordDefinition,
        _resource: &CreatedResource,
    ) -> Result<i64, AppError> {
        Ok(self.record(format!("mirror_keyword:{}", definition.text)))
    }

    async fn record_ad(
        &self,
        _ad_group_row_id: i64,
        _resource: &CreatedResource,
        final_url: &str,
    ) -> Result<i64, AppError> {
        Ok(self.record(format!("mirror_ad:{}", final_url)))
    }
}

fn campaign(name: &str, budget: f64) -> CampaignDefinition {
    CampaignDefinition {
        name: name.to_string(),
        campaign_type: "Search".to_string(),
        daily_budget: budget,
        bidding_strategy: BiddingStrategy::ManualCpc,
        networks: "Google Search".to_string(),
        languages: "English".to_string(),
        locations: "Dallas, TX".to_string(),
        kind: CampaignKind::LocationTargeted,
    }
}

fn ad_group(campaign: &str, name: &str) -> AdGroupDefinition {
    AdGroupDefinition {
        campaign_name: campaign.to_string(),
        name: name.to_string(),
        final_url: format!("https://example.com/{}", name.to_lowercase().replace(' ', "-")),
    }
}

fn keyword(campaign: &str, group: &str, text: &str) -> KeywordDefinition {
    KeywordDefinition {
        campaign_name: campaign.to_string(),
        ad_group_name: group.to_string(),
        text: text.to_string(),
        match_type: MatchType::Phrase,
        final_url: None,
    }
}

fn single_campaign_definitions() -> ParsedDefinitions {
    ParsedDefinitions {
        campaigns: vec![campaign("Westview - Assisted Living", 50.0)],
        ad_groups: vec![
            ad_group("Westview - Assisted Living", "Westview - Assisted Living"),
            ad_group("Westview - Assisted Living", "Westview - Memory Care"),
            ad_group("Westview - Assisted Living", "Westview - Independent Living"),
        ],
        keywords: vec![
            keyword(
                "Westview - Assisted Living",
                "Westview - Assisted Living",
                "assisted living dallas",
            ),
            keyword(
                "Westview - Assisted Living",
                "Westview - Memory Care",
                "memory care dallas",
            ),
        ],
    }
}

#[tokio::test]
async fn test_happy_path_counts_and_mirror_order() {
    let api = FakeAdsApi::default();
    let mirror = RecordingMirror::default();
    let provisioner = Provisioner::new(api.clone(), mirror.clone());

    let result = provisioner
        .provision_all(&single_campaign_definitions())
        .await
        .unwrap();

    assert_eq!(result.outcomes.len(), 1);
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.status, CampaignRunStatus::Succeeded);
    assert_eq!(outcome.counts.ad_groups_attempted, 3);
    assert_eq!(outcome.counts.ad_groups_created, 3);
    assert_eq!(outcome.counts.keywords_attempted, 2);
    assert_eq!(outcome.counts.keywords_created, 2);
    assert_eq!(outcome.counts.ads_attempted, 3);
    assert_eq!(outcome.counts.ads_created, 3);

    // Budget converts exactly to micro-units
    assert_eq!(api.budget_amounts.lock().unwrap()[0], 50_000_000);

    // The campaign is mirrored before any ad group work starts
    let events = mirror.events.lock().unwrap();
    assert_eq!(events[0], "mirror_campaign:Westview - Assisted Living");
    assert!(events.contains(&"mirror_keyword:assisted living dallas".to_string()));
    assert!(events.contains(&"mirror_ad:https://example.com/westview---memory-care".to_string()));
}

#[tokio::test]
async fn test_campaigns_always_created_paused() {
    let api = FakeAdsApi::default();
    let provisioner = Provisioner::new(api.clone(), RecordingMirror::default());

    provisioner
        .provision_all(&single_campaign_definitions())
        .await
        .unwrap();

    let statuses = api.campaign_statuses.lock().unwrap();
    assert_eq!(statuses.as_slice(), ["PAUSED"]);
}

#[tokio::test]
async fn test_ad_group_failure_is_isolated() {
    let api = FakeAdsApi {
        fail_ad_group_for: Arc::new(HashSet::from(["Westview - Memory Care".to_string()])),
        ..Default::default()
    };
    let provisioner = Provisioner::new(api.clone(), RecordingMirror::default());

    let result = provisioner
        .provision_all(&single_campaign_definitions())
        .await
        .unwrap();

    let outcome = &result.outcomes[0];
    // Ad groups #1 and #3 still complete; the campaign overall succeeds
    assert_eq!(outcome.status, CampaignRunStatus::Succeeded);
    assert_eq!(outcome.counts.ad_groups_attempted, 3);
    assert_eq!(outcome.counts.ad_groups_created, 2);
    assert_eq!(outcome.counts.ads_created, 2);
    // The failed group's keywords were never attempted
    assert_eq!(outcome.counts.keywords_attempted, 1);

    // The sibling ad groups were still processed after the failure
    let calls = api.calls.lock().unwrap();
    assert!(calls.contains(&"ad_group:Westview - Independent Living".to_string()));
}

#[tokio::test]
async fn test_keyword_failure_does_not_block_ad_creation() {
    let api = FakeAdsApi {
        fail_keywords_for: Arc::new(HashSet::from(["Westview - Assisted Living".to_string()])),
        ..Default::default()
    };
    let provisioner = Provisioner::new(api.clone(), RecordingMirror::default());

    let result = provisioner
        .provision_all(&single_campaign_definitions())
        .await
        .unwrap();

    let outcome = &result.outcomes[0];
    assert_eq!(outcome.status, CampaignRunStatus::Succeeded);
    assert_eq!(outcome.counts.keywords_attempted, 2);
    assert_eq!(outcome.counts.keywords_created, 1);
    // The ad for the failing group was still attempted and created
    assert_eq!(outcome.counts.ads_created, 3);
}

#[tokio::test]
async fn test_budget_failure_is_campaign_fatal_but_batch_isolated() {
    let api = FakeAdsApi {
        fail_budget_for: Arc::new(HashSet::from(["Campaign A".to_string()])),
        ..Default::default()
    };
    let provisioner = Provisioner::new(api.clone(), RecordingMirror::default());

    let definitions = ParsedDefinitions {
        campaigns: vec![campaign("Campaign A", 10.0), campaign("Campaign B", 20.0)],
        ad_groups: vec![
            ad_group("Campaign A", "A - Assisted Living"),
            ad_group("Campaign B", "B - Assisted Living"),
        ],
        keywords: vec![],
    };

    let result = provisioner.provision_all(&definitions).await.unwrap();

    assert_eq!(result.outcomes.len(), 2);
    match &result.outcomes[0].status {
        CampaignRunStatus::Failed(reason) => assert!(reason.contains("budget")),
        other => panic!("expected failure, got {:?}", other),
    }
    // Campaign A's ad-group loop never ran
    assert_eq!(result.outcomes[0].counts.ad_groups_attempted, 0);

    // Campaign B was still attempted and succeeded
    assert_eq!(result.outcomes[1].status, CampaignRunStatus::Succeeded);
    assert_eq!(result.outcomes[1].counts.ad_groups_created, 1);

    let calls = api.calls.lock().unwrap();
    assert!(!calls.contains(&"campaign:Campaign A".to_string()));
    assert!(calls.contains(&"campaign:Campaign B".to_string()));
}

#[tokio::test]
async fn test_campaign_create_failure_skips_ad_groups() {
    let api = FakeAdsApi {
        fail_campaign_for: Arc::new(HashSet::from(["Westview - Assisted Living".to_string()])),
        ..Default::default()
    };
    let provisioner = Provisioner::new(api.clone(), RecordingMirror::default());

    let result = provisioner
        .provision_all(&single_campaign_definitions())
        .await
        .unwrap();

    match &result.outcomes[0].status {
        CampaignRunStatus::Failed(reason) => assert!(reason.contains("campaign creation")),
        other => panic!("expected failure, got {:?}", other),
    }
    let calls = api.calls.lock().unwrap();
    assert!(!calls.iter().any(|c| c.starts_with("ad_group:")));
}

#[tokio::test]
async fn test_duplicate_campaign_names_rejected_up_front() {
    let api = FakeAdsApi::default();
    let provisioner = Provisioner::new(api.clone(), RecordingMirror::default());

    let definitions = ParsedDefinitions {
        campaigns: vec![campaign("Same Name", 10.0), campaign("Same Name", 20.0)],
        ad_groups: vec![],
        keywords: vec![],
    };

    let result = provisioner.provision_all(&definitions).await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
    // Nothing was attempted remotely
    assert!(api.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_conversion_tracking_returns_label() {
    let api = FakeAdsApi::default();
    let provisioner = Provisioner::new(api, RecordingMirror::default());

    let result = provisioner.ensure_conversion_tracking().await.unwrap();
    assert_eq!(result.label, "AbCdEf12");
    assert_eq!(result.name, "Lead Form Submission");
}
