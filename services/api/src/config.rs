//! API service configuration

use anyhow::Result;
use chrono_tz::Tz;

/// Configuration for the API service
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Timezone used when rendering timestamps in responses
    pub timezone: Tz,
}

impl ApiConfig {
    /// Create a new ApiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDR`: Listen address (default: "0.0.0.0:8000")
    /// - `APP_TIMEZONE`: IANA timezone name (default: "Asia/Tokyo")
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let tz_name =
            std::env::var("APP_TIMEZONE").unwrap_or_else(|_| "Asia/Tokyo".to_string());
        let timezone: Tz = tz_name
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid APP_TIMEZONE '{}': {}", tz_name, e))?;

        Ok(Self {
            bind_addr,
            timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_api_config_defaults() {
        unsafe {
            std::env::remove_var("BIND_ADDR");
            std::env::remove_var("APP_TIMEZONE");
        }

        let config = ApiConfig::from_env().expect("Failed to create api config");
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    #[serial]
    fn test_api_config_rejects_bad_timezone() {
        unsafe {
            std::env::set_var("APP_TIMEZONE", "Not/AZone");
        }

        assert!(ApiConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("APP_TIMEZONE");
        }
    }
}
