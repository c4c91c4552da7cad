use serde::{Deserialize, Serialize};

use crate::errors::AppError;

// ============ Platform limits for responsive search ads ============

/// Maximum number of headlines the platform accepts per ad.
pub const MAX_HEADLINES: usize = 15;
/// Minimum number of headlines the platform requires per ad.
pub const MIN_HEADLINES: usize = 3;
/// Maximum number of descriptions the platform accepts per ad.
pub const MAX_DESCRIPTIONS: usize = 4;
/// Minimum number of descriptions the platform requires per ad.
pub const MIN_DESCRIPTIONS: usize = 2;
/// Character cap for a single headline.
pub const HEADLINE_MAX_LEN: usize = 30;
/// Character cap for a single description.
pub const DESCRIPTION_MAX_LEN: usize = 90;
/// Character cap for a display-URL path segment.
pub const PATH_MAX_LEN: usize = 15;

// ============ Definition Models ============

/// How a campaign targets searchers; decides which ad copy variant is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignKind {
    /// Company-wide brand campaign with a fixed copy set.
    Brand,
    /// Per-location campaign; copy is templated from the ad group identity.
    LocationTargeted,
}

/// Bidding strategy selector for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiddingStrategy {
    ManualCpc,
    MaximizeConversions,
    TargetCpa,
}

impl BiddingStrategy {
    /// Parses a definition-file token, defaulting to manual CPC on
    /// unrecognized content (the parser is permissive by contract).
    pub fn parse(text: &str) -> Self {
        match text.trim().to_uppercase().as_str() {
            "MAXIMIZE_CONVERSIONS" => BiddingStrategy::MaximizeConversions,
            "TARGET_CPA" => BiddingStrategy::TargetCpa,
            _ => BiddingStrategy::ManualCpc,
        }
    }
}

/// Keyword matching strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl MatchType {
    /// Parses a definition-file token, defaulting to broad match.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_uppercase().as_str() {
            "EXACT" => MatchType::Exact,
            "PHRASE" => MatchType::Phrase,
            _ => MatchType::Broad,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "EXACT",
            MatchType::Phrase => "PHRASE",
            MatchType::Broad => "BROAD",
        }
    }
}

/// Serving status for a campaign or ad group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Enabled,
    Paused,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Enabled => "ENABLED",
            CampaignStatus::Paused => "PAUSED",
        }
    }
}

/// One campaign row parsed from the definition file.
///
/// Immutable once parsed; consumed once per provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDefinition {
    /// Campaign name, unique within a batch by convention (validated at
    /// orchestration time, not parse time).
    pub name: String,
    /// Campaign type token from the definition (e.g. "Search").
    pub campaign_type: String,
    /// Daily budget in whole currency units.
    pub daily_budget: f64,
    /// Bidding strategy selector.
    pub bidding_strategy: BiddingStrategy,
    /// Network targeting string (e.g. "Google Search").
    pub networks: String,
    /// Language targeting string.
    pub languages: String,
    /// Location targeting string; empty for nationwide campaigns.
    pub locations: String,
    /// Brand vs. location-targeted, assigned at parse time.
    pub kind: CampaignKind,
}

/// One ad-group row parsed from the definition file.
///
/// Owned by campaign name, not id; resolved at orchestration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroupDefinition {
    pub campaign_name: String,
    pub name: String,
    pub final_url: String,
}

/// One keyword row parsed from the definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordDefinition {
    pub campaign_name: String,
    pub ad_group_name: String,
    pub text: String,
    pub match_type: MatchType,
    /// Optional per-keyword destination override.
    pub final_url: Option<String>,
}

// ============ Created Resources ============

/// A resource the platform reports as created: the opaque path-like
/// resource name plus the numeric id parsed from its tail.
///
/// Only ever constructed from a successful create response, never
/// speculatively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResource {
    /// Platform resource name, e.g. `customers/123/campaigns/456`.
    pub resource_name: String,
    /// Numeric id parsed from the last path segment. Criterion resource
    /// names carry a composite `parent~id` tail; the id is the part after
    /// the tilde.
    pub id: i64,
}

impl CreatedResource {
    pub fn from_resource_name(resource_name: impl Into<String>) -> Self {
        let resource_name = resource_name.into();
        let id = parse_resource_id(&resource_name).unwrap_or(0);
        Self { resource_name, id }
    }
}

/// Extracts the numeric id from the tail of a platform resource name.
pub fn parse_resource_id(resource_name: &str) -> Option<i64> {
    let tail = resource_name.rsplit('/').next()?;
    let id_part = tail.rsplit('~').next()?;
    id_part.parse::<i64>().ok()
}

/// Converts whole currency units per day to the platform's integer
/// micro-unit representation.
pub fn to_micros(amount: f64) -> i64 {
    (amount * 1_000_000.0).round() as i64
}

// ============ Ad Copy ============

/// A validated set of responsive-search-ad assets.
///
/// Count and length bounds are enforced client-side via [`AdCopySet::validate`]
/// before anything is submitted to the remote API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdCopySet {
    /// 3-15 headlines, each at most 30 characters.
    pub headlines: Vec<String>,
    /// 2-4 descriptions, each at most 90 characters.
    pub descriptions: Vec<String>,
    /// Optional display-URL path segments, each at most 15 characters.
    pub path1: Option<String>,
    pub path2: Option<String>,
}

impl AdCopySet {
    /// Rejects any count or character-length violation before submission.
    /// Lengths are measured in characters, not bytes.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.headlines.len() < MIN_HEADLINES || self.headlines.len() > MAX_HEADLINES {
            return Err(AppError::ValidationError(format!(
                "Ad requires {}-{} headlines, got {}",
                MIN_HEADLINES,
                MAX_HEADLINES,
                self.headlines.len()
            )));
        }
        if self.descriptions.len() < MIN_DESCRIPTIONS || self.descriptions.len() > MAX_DESCRIPTIONS
        {
            return Err(AppError::ValidationError(format!(
                "Ad requires {}-{} descriptions, got {}",
                MIN_DESCRIPTIONS,
                MAX_DESCRIPTIONS,
                self.descriptions.len()
            )));
        }
        for headline in &self.headlines {
            if headline.chars().count() > HEADLINE_MAX_LEN {
                return Err(AppError::ValidationError(format!(
                    "Headline exceeds {} characters: {}",
                    HEADLINE_MAX_LEN, headline
                )));
            }
        }
        for description in &self.descriptions {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                return Err(AppError::ValidationError(format!(
                    "Description exceeds {} characters: {}",
                    DESCRIPTION_MAX_LEN, description
                )));
            }
        }
        for path in [&self.path1, &self.path2].into_iter().flatten() {
            if path.chars().count() > PATH_MAX_LEN {
                return Err(AppError::ValidationError(format!(
                    "Display path exceeds {} characters: {}",
                    PATH_MAX_LEN, path
                )));
            }
        }
        Ok(())
    }
}

// ============ Conversion Actions ============

/// Goal category for a conversion action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionCategory {
    Lead,
    Purchase,
    Signup,
    PageView,
    Download,
}

impl ConversionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionCategory::Lead => "LEAD",
            ConversionCategory::Purchase => "PURCHASE",
            ConversionCategory::Signup => "SIGNUP",
            ConversionCategory::PageView => "PAGE_VIEW",
            ConversionCategory::Download => "DOWNLOAD",
        }
    }
}

/// How repeat conversions from one click are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountingType {
    OnePerClick,
    ManyPerClick,
}

impl CountingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountingType::OnePerClick => "ONE_PER_CLICK",
            CountingType::ManyPerClick => "MANY_PER_CLICK",
        }
    }
}

/// Attribution model applied to the conversion action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributionModel {
    LastClick,
    FirstClick,
    Linear,
    DataDriven,
}

impl AttributionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributionModel::LastClick => "GOOGLE_ADS_LAST_CLICK",
            AttributionModel::FirstClick => "GOOGLE_SEARCH_ATTRIBUTION_FIRST_CLICK",
            AttributionModel::Linear => "GOOGLE_SEARCH_ATTRIBUTION_LINEAR",
            AttributionModel::DataDriven => "GOOGLE_SEARCH_ATTRIBUTION_DATA_DRIVEN",
        }
    }
}

/// Authored configuration for a conversion action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionActionConfig {
    pub name: String,
    pub category: ConversionCategory,
    /// Default monetary value attributed to each conversion.
    pub default_value: f64,
    pub counting_type: CountingType,
    pub attribution_model: AttributionModel,
    /// View-through lookback window in days.
    pub view_through_lookback_days: i32,
    /// Click-through lookback window in days.
    pub click_through_lookback_days: i32,
}

impl ConversionActionConfig {
    /// The account's lead-form submission goal, provisioned once per run.
    pub fn lead_form_default() -> Self {
        Self {
            name: "Lead Form Submission".to_string(),
            category: ConversionCategory::Lead,
            default_value: 50.0,
            counting_type: CountingType::OnePerClick,
            attribution_model: AttributionModel::DataDriven,
            view_through_lookback_days: 1,
            click_through_lookback_days: 30,
        }
    }
}

/// A conversion action as created (or found) on the platform.
///
/// The `label` is derived, never authored: it exists only when the tag
/// snippet text returned by the platform parses. An empty label is a
/// valid, non-fatal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionActionResult {
    pub resource: CreatedResource,
    pub name: String,
    pub label: String,
}

// ============ Batch Results ============

/// Per-campaign counts of child resources created versus attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionCounts {
    pub ad_groups_attempted: usize,
    pub ad_groups_created: usize,
    pub keywords_attempted: usize,
    pub keywords_created: usize,
    pub ads_attempted: usize,
    pub ads_created: usize,
}

/// Terminal status for one campaign within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignRunStatus {
    Succeeded,
    Failed(String),
}

/// Outcome of provisioning one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignOutcome {
    pub campaign_name: String,
    pub status: CampaignRunStatus,
    pub counts: ProvisionCounts,
}

impl CampaignOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == CampaignRunStatus::Succeeded
    }
}

/// The unit reported to the operator at the end of a run.
///
/// Built incrementally during orchestration; immutable once the run ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<CampaignOutcome>,
}

impl BatchResult {
    pub fn succeeded(&self) -> impl Iterator<Item = &CampaignOutcome> {
        self.outcomes.iter().filter(|o| o.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CampaignOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_micros_whole_dollars() {
        assert_eq!(to_micros(50.0), 50_000_000);
        assert_eq!(to_micros(1.0), 1_000_000);
    }

    #[test]
    fn test_to_micros_cents() {
        assert_eq!(to_micros(0.01), 10_000);
        assert_eq!(to_micros(12.34), 12_340_000);
    }

    #[test]
    fn test_resource_id_from_simple_tail() {
        assert_eq!(
            parse_resource_id("customers/123/campaigns/456789"),
            Some(456789)
        );
    }

    #[test]
    fn test_resource_id_from_criterion_tail() {
        // Criterion resource names carry a composite tail
        assert_eq!(
            parse_resource_id("customers/123/adGroupCriteria/456~789"),
            Some(789)
        );
    }

    #[test]
    fn test_resource_id_unparseable() {
        assert_eq!(parse_resource_id("customers/123/campaigns/abc"), None);
        assert_eq!(CreatedResource::from_resource_name("nonsense").id, 0);
    }

    #[test]
    fn test_ad_copy_validation_bounds() {
        let valid = AdCopySet {
            headlines: vec!["A".into(), "B".into(), "C".into()],
            descriptions: vec!["one".into(), "two".into()],
            path1: Some("seniors".into()),
            path2: None,
        };
        assert!(valid.validate().is_ok());

        let too_few_headlines = AdCopySet {
            headlines: vec!["A".into()],
            descriptions: vec!["one".into(), "two".into()],
            path1: None,
            path2: None,
        };
        assert!(too_few_headlines.validate().is_err());

        let overlong = AdCopySet {
            headlines: vec!["x".repeat(31), "B".into(), "C".into()],
            descriptions: vec!["one".into(), "two".into()],
            path1: None,
            path2: None,
        };
        assert!(overlong.validate().is_err());
    }

    #[test]
    fn test_bidding_strategy_parse_permissive() {
        assert_eq!(
            BiddingStrategy::parse("maximize_conversions"),
            BiddingStrategy::MaximizeConversions
        );
        assert_eq!(BiddingStrategy::parse("TARGET_CPA"), BiddingStrategy::TargetCpa);
        assert_eq!(BiddingStrategy::parse("???"), BiddingStrategy::ManualCpc);
    }
}
