//! Google Ads REST API client.
//!
//! Implements [`AdsApi`] over the JSON mutate/search endpoints. OAuth2
//! access tokens are exchanged from the configured refresh token and cached
//! for the lifetime of the client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::ads_api::{AdsApi, CreatedKeyword, KeywordSpec};
use crate::config::Config;
use crate::conversion_label::extract_label;
use crate::errors::AppError;
use crate::models::{
    AdCopySet, BiddingStrategy, CampaignStatus, ConversionActionConfig, ConversionActionResult,
    CreatedResource,
};

pub struct GoogleAdsClient {
    client: reqwest::Client,
    api_base_url: String,
    oauth_base_url: String,
    customer_id: String,
    developer_token: String,
    login_customer_id: Option<String>,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    /// Cached OAuth access token, fetched lazily on first use.
    access_token: Mutex<Option<String>>,
}

impl GoogleAdsClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ConfigError(format!("Failed to create Google Ads client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            oauth_base_url: config.oauth_base_url.clone(),
            customer_id: config.customer_id.clone(),
            developer_token: config.developer_token.clone(),
            login_customer_id: config.login_customer_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            access_token: Mutex::new(None),
        })
    }

    /// Exchanges the refresh token for an access token, reusing a cached
    /// token when one is present.
    async fn access_token(&self) -> Result<String, AppError> {
        let mut cached = self.access_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let url = format!("{}/token", self.oauth_base_url);
        tracing::debug!("Exchanging refresh token for access token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ApiError(format!("OAuth token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ApiError(format!(
                "OAuth token endpoint returned {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ApiError(format!("Failed to parse OAuth token response: {}", e))
        })?;

        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::ApiError("OAuth response missing access_token".to_string())
            })?
            .to_string();

        *cached = Some(token.clone());
        Ok(token)
    }

    /// POSTs a JSON body to a customer-scoped endpoint and returns the
    /// parsed response. Non-2xx responses carry the body text in the error.
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, AppError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/customers/{}/{}",
            self.api_base_url, self.customer_id, path
        );

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("developer-token", &self.developer_token)
            .json(&body);

        if let Some(ref login_id) = self.login_customer_id {
            request = request.header("login-customer-id", login_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ApiError(format!("Google Ads request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ApiError(format!(
                "{} returned {}: {}",
                path, status, error_text
            )));
        }

        let data = response.json().await.map_err(|e| {
            AppError::ApiError(format!("Failed to parse Google Ads response: {}", e))
        })?;

        Ok(data)
    }

    /// Runs a single mutate operation and returns the created resource.
    async fn mutate_single(&self, resource: &str, operation: Value) -> Result<CreatedResource, AppError> {
        let body = json!({ "operations": [operation] });
        let response = self.post_json(&format!("{}:mutate", resource), body).await?;
        first_resource_name(&response)
            .map(CreatedResource::from_resource_name)
            .ok_or_else(|| {
                AppError::ApiError(format!("{} mutate response missing resourceName", resource))
            })
    }

    /// Looks up a conversion action by name, returning its resource name
    /// and raw tag snippets when it exists.
    async fn find_conversion_action(
        &self,
        name: &str,
    ) -> Result<Option<(CreatedResource, Vec<String>)>, AppError> {
        let query = format!(
            "SELECT conversion_action.resource_name, conversion_action.id, \
             conversion_action.tag_snippets FROM conversion_action \
             WHERE conversion_action.name = '{}'",
            name.replace('\'', "\\'")
        );
        let response = self
            .post_json("googleAds:search", json!({ "query": query }))
            .await?;

        let row = match response
            .get("results")
            .and_then(|r| r.as_array())
            .and_then(|rows| rows.first())
        {
            Some(row) => row,
            None => return Ok(None),
        };

        let action = row.get("conversionAction").cloned().unwrap_or(Value::Null);
        let resource_name = action
            .get("resourceName")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AppError::ApiError("Conversion action row missing resourceName".to_string())
            })?;

        let snippets = collect_tag_snippets(&action);
        Ok(Some((
            CreatedResource::from_resource_name(resource_name),
            snippets,
        )))
    }
}

/// Pulls every snippet string out of a conversion action's `tagSnippets`.
fn collect_tag_snippets(action: &Value) -> Vec<String> {
    let mut snippets = Vec::new();
    if let Some(entries) = action.get("tagSnippets").and_then(|v| v.as_array()) {
        for entry in entries {
            for key in ["eventSnippet", "globalSiteTag"] {
                if let Some(text) = entry.get(key).and_then(|v| v.as_str()) {
                    snippets.push(text.to_string());
                }
            }
        }
    }
    snippets
}

fn first_resource_name(response: &Value) -> Option<&str> {
    response
        .get("results")
        .and_then(|r| r.as_array())
        .and_then(|results| results.first())
        .and_then(|r| r.get("resourceName"))
        .and_then(|v| v.as_str())
}

#[async_trait]
impl AdsApi for GoogleAdsClient {
    async fn create_budget(
        &self,
        name: &str,
        amount_micros: i64,
    ) -> Result<CreatedResource, AppError> {
        tracing::info!("Creating campaign budget: {} ({} micros)", name, amount_micros);
        let operation = json!({
            "create": {
                "name": name,
                "amountMicros": amount_micros.to_string(),
                "deliveryMethod": "STANDARD",
                "explicitlyShared": false
            }
        });
        self.mutate_single("campaignBudgets", operation).await
    }

    async fn create_campaign(
        &self,
        name: &str,
        status: CampaignStatus,
        budget_resource: &str,
        bidding_strategy: BiddingStrategy,
    ) -> Result<CreatedResource, AppError> {
        tracing::info!("Creating campaign: {} ({})", name, status.as_str());
        let mut campaign = json!({
            "name": name,
            "status": status.as_str(),
            "advertisingChannelType": "SEARCH",
            "campaignBudget": budget_resource,
            "networkSettings": {
                "targetGoogleSearch": true,
                "targetSearchNetwork": false,
                "targetContentNetwork": false,
                "targetPartnerSearchNetwork": false
            }
        });
        match bidding_strategy {
            BiddingStrategy::ManualCpc => campaign["manualCpc"] = json!({}),
            BiddingStrategy::MaximizeConversions => campaign["maximizeConversions"] = json!({}),
            BiddingStrategy::TargetCpa => campaign["targetCpa"] = json!({}),
        }
        self.mutate_single("campaigns", json!({ "create": campaign }))
            .await
    }

    async fn create_ad_group(
        &self,
        name: &str,
        campaign_resource: &str,
        cpc_bid_micros: Option<i64>,
        status: CampaignStatus,
    ) -> Result<CreatedResource, AppError> {
        tracing::info!("Creating ad group: {}", name);
        let mut ad_group = json!({
            "name": name,
            "campaign": campaign_resource,
            "status": status.as_str(),
            "type": "SEARCH_STANDARD"
        });
        if let Some(bid) = cpc_bid_micros {
            ad_group["cpcBidMicros"] = json!(bid.to_string());
        }
        self.mutate_single("adGroups", json!({ "create": ad_group }))
            .await
    }

    async fn add_keywords(
        &self,
        ad_group_resource: &str,
        keywords: &[KeywordSpec],
    ) -> Result<Vec<CreatedKeyword>, AppError> {
        tracing::info!(
            "Adding {} keywords to {}",
            keywords.len(),
            ad_group_resource
        );
        let operations: Vec<Value> = keywords
            .iter()
            .map(|kw| {
                json!({
                    "create": {
                        "adGroup": ad_group_resource,
                        "status": "ENABLED",
                        "keyword": {
                            "text": kw.text,
                            "matchType": kw.match_type.as_str()
                        }
                    }
                })
            })
            .collect();

        let response = self
            .post_json("adGroupCriteria:mutate", json!({ "operations": operations }))
            .await?;

        let results = response
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| {
                AppError::ApiError("Keyword mutate response missing results".to_string())
            })?;

        // Results come back in operation order
        Ok(results
            .iter()
            .zip(keywords)
            .filter_map(|(row, kw)| {
                row.get("resourceName").and_then(|v| v.as_str()).map(|rn| {
                    CreatedKeyword {
                        resource: CreatedResource::from_resource_name(rn),
                        text: kw.text.clone(),
                    }
                })
            })
            .collect())
    }

    async fn create_responsive_search_ad(
        &self,
        ad_group_resource: &str,
        copy: &AdCopySet,
        final_url: &str,
    ) -> Result<CreatedResource, AppError> {
        // Count/length violations are rejected here, not by the platform
        copy.validate()?;

        tracing::info!("Creating responsive search ad under {}", ad_group_resource);
        let headlines: Vec<Value> = copy.headlines.iter().map(|t| json!({ "text": t })).collect();
        let descriptions: Vec<Value> = copy
            .descriptions
            .iter()
            .map(|t| json!({ "text": t }))
            .collect();

        let mut rsa = json!({
            "headlines": headlines,
            "descriptions": descriptions
        });
        if let Some(ref path1) = copy.path1 {
            rsa["path1"] = json!(path1);
        }
        if let Some(ref path2) = copy.path2 {
            rsa["path2"] = json!(path2);
        }

        let operation = json!({
            "create": {
                "adGroup": ad_group_resource,
                "status": "ENABLED",
                "ad": {
                    "finalUrls": [final_url],
                    "responsiveSearchAd": rsa
                }
            }
        });
        self.mutate_single("adGroupAds", operation).await
    }

    async fn ensure_conversion_action(
        &self,
        config: &ConversionActionConfig,
    ) -> Result<ConversionActionResult, AppError> {
        // Reuse an existing action of the same name when one exists
        if let Some((resource, snippets)) = self.find_conversion_action(&config.name).await? {
            tracing::info!("Conversion action already exists: {}", config.name);
            let label = label_from_snippets(&snippets);
            return Ok(ConversionActionResult {
                resource,
                name: config.name.clone(),
                label,
            });
        }

        tracing::info!("Creating conversion action: {}", config.name);
        let operation = json!({
            "create": {
                "name": config.name,
                "type": "WEBPAGE",
                "status": "ENABLED",
                "category": config.category.as_str(),
                "countingType": config.counting_type.as_str(),
                "attributionModelSettings": {
                    "attributionModel": config.attribution_model.as_str()
                },
                "valueSettings": {
                    "defaultValue": config.default_value,
                    "alwaysUseDefaultValue": true
                },
                "viewThroughLookbackWindowDays": config.view_through_lookback_days,
                "clickThroughLookbackWindowDays": config.click_through_lookback_days
            }
        });
        let resource = self.mutate_single("conversionActions", operation).await?;

        // The mutate response carries no snippets; fetch them back. A
        // failed fetch leaves the action valid with an empty label.
        let label = match self.find_conversion_action(&config.name).await {
            Ok(Some((_, snippets))) => label_from_snippets(&snippets),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!("Could not fetch tag snippets for {}: {}", config.name, e);
                String::new()
            }
        };

        Ok(ConversionActionResult {
            resource,
            name: config.name.clone(),
            label,
        })
    }
}

/// First label recovered from any snippet; empty when none parses.
fn label_from_snippets(snippets: &[String]) -> String {
    snippets
        .iter()
        .find_map(|s| extract_label(s))
        .unwrap_or_default()
}
