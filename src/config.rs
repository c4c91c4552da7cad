use serde::Deserialize;

/// Runtime configuration, loaded from the environment before any remote
/// call is attempted. Missing or empty credentials are fatal.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub developer_token: String,
    pub customer_id: String,
    pub refresh_token: String,
    /// Manager account id, required when the customer is accessed through
    /// an MCC hierarchy.
    pub login_customer_id: Option<String>,
    /// Path to the campaign definition file.
    pub definition_path: String,
    /// Google Ads API base URL, overridable for tests.
    pub api_base_url: String,
    /// OAuth token endpoint base URL, overridable for tests.
    pub oauth_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DATABASE_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            client_id: require_env("GOOGLE_ADS_CLIENT_ID")?,
            client_secret: require_env("GOOGLE_ADS_CLIENT_SECRET")?,
            developer_token: require_env("GOOGLE_ADS_DEVELOPER_TOKEN")?,
            customer_id: require_env("GOOGLE_ADS_CUSTOMER_ID").and_then(|id| {
                // The API wants the bare digits, not the 123-456-7890 display form
                let digits: String = id.chars().filter(|c| c.is_ascii_digit()).collect();
                if digits.is_empty() {
                    anyhow::bail!("GOOGLE_ADS_CUSTOMER_ID must contain digits");
                }
                Ok(digits)
            })?,
            refresh_token: require_env("GOOGLE_ADS_REFRESH_TOKEN")?,
            login_customer_id: std::env::var("GOOGLE_ADS_LOGIN_CUSTOMER_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|id| id.chars().filter(|c| c.is_ascii_digit()).collect()),
            definition_path: std::env::var("DEFINITION_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "data/campaign-definitions.md".to_string()),
            api_base_url: std::env::var("GOOGLE_ADS_API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "https://googleads.googleapis.com/v17".to_string()),
            oauth_base_url: std::env::var("GOOGLE_OAUTH_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "https://oauth2.googleapis.com".to_string()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Customer ID: {}", config.customer_id);
        if let Some(ref login) = config.login_customer_id {
            tracing::debug!("Login customer ID: {}", login);
        }
        tracing::debug!("Definition path: {}", config.definition_path);
        tracing::debug!("API base URL: {}", config.api_base_url);

        Ok(config)
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))
        .and_then(|value| {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            Ok(value)
        })
}
