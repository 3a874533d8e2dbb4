use std::env;
use tokio::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub name: String,
    pub url: Url,
    pub polling_interval: Duration,
}

const DEFAULT_NAME: &str = "Indoor Air Sensor";

impl BridgeConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let raw_url =
            env::var("SENSOR_URL").map_err(|_| "SENSOR_URL environment variable not set")?;
        let url = Url::parse(&raw_url).map_err(|e| format!("Invalid SENSOR_URL: {}", e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "SENSOR_URL must be an http(s) endpoint, got scheme '{}'",
                url.scheme()
            )
            .into());
        }

        let raw_interval = env::var("POLLING_INTERVAL_MS")
            .map_err(|_| "POLLING_INTERVAL_MS environment variable not set")?;
        let interval_ms: u64 = raw_interval
            .trim()
            .parse()
            .map_err(|_| format!("POLLING_INTERVAL_MS is not a valid integer: '{}'", raw_interval))?;
        if interval_ms == 0 {
            return Err("POLLING_INTERVAL_MS must be greater than zero".into());
        }

        let name = env::var("SENSOR_NAME").unwrap_or_else(|_| DEFAULT_NAME.to_string());

        Ok(BridgeConfig {
            name,
            url,
            polling_interval: Duration::from_millis(interval_ms),
        })
    }

    /// Timeout applied to each fetch. Half the polling interval, so a hung
    /// endpoint can never leave a request in flight when the next tick fires.
    pub fn fetch_timeout(&self) -> Duration {
        self.polling_interval / 2
    }
}
