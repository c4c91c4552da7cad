//! Responsive-search-ad copy generation.
//!
//! Two variants: location-targeted campaigns get copy templated from the
//! ad-group identity (location + care-type tokens), brand campaigns get a
//! fixed company-wide set. Every generated string passes through
//! [`truncate_to_limit`], so nothing over the platform caps ever reaches
//! the remote adapter.

use crate::models::{
    AdCopySet, CampaignKind, DESCRIPTION_MAX_LEN, HEADLINE_MAX_LEN, MAX_DESCRIPTIONS,
    MAX_HEADLINES, PATH_MAX_LEN,
};

const COMPANY_NAME: &str = "Silver Oaks Senior Living";
const COMPANY_PHONE: &str = "(855) 012-3456";

/// Separator between the location and category tokens of a composite
/// ad-group name, e.g. `Westview - Assisted Living`.
const IDENTITY_SEPARATOR: &str = " - ";

/// The location/care-type identity decomposed from an ad-group name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdGroupIdentity {
    pub location: String,
    pub category: String,
}

impl AdGroupIdentity {
    /// Splits a composite ad-group name on the fixed separator. Names
    /// without a separator keep the whole name as the location and fall
    /// back to a generic category.
    pub fn from_name(ad_group_name: &str) -> Self {
        match ad_group_name.split_once(IDENTITY_SEPARATOR) {
            Some((location, category)) => Self {
                location: location.trim().to_string(),
                category: category.trim().to_string(),
            },
            None => Self {
                location: ad_group_name.trim().to_string(),
                category: "Senior Living".to_string(),
            },
        }
    }
}

/// Cuts a string to `cap - 3` characters with an ellipsis appended when it
/// exceeds the cap. Over-length strings are never dropped or passed
/// through. Pure and idempotent for already-compliant input.
pub fn truncate_to_limit(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let kept: String = text.chars().take(cap - 3).collect();
    format!("{}...", kept)
}

/// Produces the full ad copy set for an ad group, selecting the brand or
/// location-targeted variant by campaign kind. List counts are capped at
/// the platform maxima; each string is capped at its character limit.
pub fn generate(kind: CampaignKind, ad_group_name: &str, final_url: &str) -> AdCopySet {
    match kind {
        CampaignKind::Brand => brand_copy(),
        CampaignKind::LocationTargeted => {
            let identity = AdGroupIdentity::from_name(ad_group_name);
            location_copy(&identity, final_url)
        }
    }
}

/// Ordered headline candidates for a location-targeted ad group.
pub fn headlines(identity: &AdGroupIdentity, _final_url: &str) -> Vec<String> {
    let location = &identity.location;
    let category = &identity.category;
    let candidates = vec![
        format!("{} in {}", category, location),
        format!("{} Senior Living", location),
        format!("{} {}", location, category),
        format!("Trusted {} Community", category),
        format!("Compassionate {}", category),
        format!("Tour {} Today", location),
        "Schedule a Tour Today".to_string(),
        format!("Call {}", COMPANY_PHONE),
        format!("Award-Winning {}", category),
        format!("{} Near You", category),
        format!("Welcome Home to {}", location),
        "Caring Staff, 24/7 Support".to_string(),
        format!("Affordable {}", category),
        "Chef-Prepared Daily Meals".to_string(),
        "Vibrant Activity Calendar".to_string(),
        format!("Why Families Choose {}", location),
    ];

    cap_list(candidates, HEADLINE_MAX_LEN, MAX_HEADLINES)
}

/// Ordered description candidates for a location-targeted ad group.
pub fn descriptions(identity: &AdGroupIdentity, _final_url: &str) -> Vec<String> {
    let location = &identity.location;
    let category = &identity.category;
    let candidates = vec![
        format!(
            "Discover {} at {}. Schedule your personal tour today.",
            category, location
        ),
        format!(
            "{} offers compassionate {} tailored to your family's needs.",
            location, category
        ),
        format!(
            "Find the right senior care in {}. Speak with our team now.",
            location
        ),
        format!(
            "Comfort, community, and care. Learn why families choose {}.",
            location
        ),
        format!("Call {} to learn about availability and pricing.", COMPANY_PHONE),
    ];

    cap_list(candidates, DESCRIPTION_MAX_LEN, MAX_DESCRIPTIONS)
}

/// Fixed company-wide copy for brand campaigns.
fn brand_copy() -> AdCopySet {
    let headlines = vec![
        COMPANY_NAME.to_string(),
        "Senior Living Communities".to_string(),
        "Assisted Living & Memory Care".to_string(),
        "Independent Living Options".to_string(),
        "Schedule a Tour Today".to_string(),
        format!("Call {}", COMPANY_PHONE),
        "Caring Staff, 24/7 Support".to_string(),
        "Award-Winning Communities".to_string(),
        "Find a Community Near You".to_string(),
        "Vibrant Senior Lifestyles".to_string(),
    ];
    let descriptions = vec![
        format!(
            "{} offers assisted living, memory care, and independent living.",
            COMPANY_NAME
        ),
        "Compassionate care in warm, welcoming communities. Tour today.".to_string(),
        "Chef-prepared meals, daily activities, and caring staff around the clock.".to_string(),
        format!("Call {} to find the right community for your family.", COMPANY_PHONE),
    ];

    AdCopySet {
        headlines: cap_list(headlines, HEADLINE_MAX_LEN, MAX_HEADLINES),
        descriptions: cap_list(descriptions, DESCRIPTION_MAX_LEN, MAX_DESCRIPTIONS),
        path1: Some(truncate_to_limit("communities", PATH_MAX_LEN)),
        path2: None,
    }
}

fn location_copy(identity: &AdGroupIdentity, final_url: &str) -> AdCopySet {
    AdCopySet {
        headlines: headlines(identity, final_url),
        descriptions: descriptions(identity, final_url),
        path1: Some(path_segment(&identity.category)),
        path2: Some(path_segment(&identity.location)),
    }
}

/// Lowercase, hyphenated display-path segment within the platform cap.
fn path_segment(token: &str) -> String {
    let slug: String = token
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    let capped: String = slug.chars().take(PATH_MAX_LEN).collect();
    capped.trim_matches('-').to_string()
}

/// Truncates each candidate to its character cap, then the list to the
/// platform maximum.
fn cap_list(candidates: Vec<String>, char_cap: usize, max_items: usize) -> Vec<String> {
    candidates
        .into_iter()
        .map(|c| truncate_to_limit(&c, char_cap))
        .take(max_items)
        .collect()
}
