use std::env;
use std::time::Duration;

/// Connection settings for the external render service.
///
/// Layering: built-in defaults, then `.env` / environment, then any CLI
/// override passed by the caller.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

impl BackendConfig {
    pub fn load(override_url: Option<&str>) -> anyhow::Result<Self> {
        // a missing .env file is fine, the defaults cover it
        let _ = dotenvy::dotenv();

        let base_url = match override_url {
            Some(url) => url.to_string(),
            None => env::var("PM_BACKEND_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let timeout_secs: u64 = match env::var("PM_BACKEND_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PM_BACKEND_TIMEOUT_SECS must be a number, got '{raw}'"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Per-image parameters forwarded to the render service unchanged.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            steps: 20,
            cfg_scale: 7.0,
            sampler: "Euler a".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_url_wins_and_is_normalized() {
        let cfg = BackendConfig::load(Some("http://10.0.0.2:7860/")).unwrap();
        assert_eq!(cfg.base_url, "http://10.0.0.2:7860");
    }
}
