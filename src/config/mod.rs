use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-user cooldown between admitted /check requests, in seconds.
    #[serde(default = "default_user_cooldown_secs")]
    pub user_cooldown_secs: u64,

    /// Base URL of the road-tax enquiry portal.
    #[serde(default = "default_portal_base_url")]
    pub portal_base_url: String,

    /// Whole-request timeout for one portal enquiry, in seconds.
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_user_cooldown_secs() -> u64 {
    15
}

fn default_portal_base_url() -> String {
    "https://vrl.lta.gov.sg".to_string()
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // envy over an empty map exercises every default.
        let config: AppConfig = envy::from_iter(std::iter::empty::<(String, String)>())
            .expect("defaults suffice");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.user_cooldown_secs, 15);
        assert_eq!(config.portal_base_url, "https://vrl.lta.gov.sg");
        assert_eq!(config.lookup_timeout_secs, 10);
    }

    #[test]
    fn test_overrides() {
        let vars = [
            ("USER_COOLDOWN_SECS".to_string(), "30".to_string()),
            ("PORTAL_BASE_URL".to_string(), "http://localhost:8080".to_string()),
        ];
        let config: AppConfig = envy::from_iter(vars).expect("overrides parse");
        assert_eq!(config.user_cooldown_secs, 30);
        assert_eq!(config.portal_base_url, "http://localhost:8080");
    }
}
