//! Environment configuration
//!
//! Every key is optional. Invalid values are reported, never silently
//! replaced with defaults.
//!
//! | Key | Default |
//! |---|---|
//! | `QUAKE_BIND` | `0.0.0.0` |
//! | `QUAKE_PORT` | `8080` |
//! | `QUAKE_STORE_URL` | `sqlite://quakes.db` |
//! | `QUAKE_STORE_TIMEOUT_SECS` | `5` |
//! | `QUAKE_FEED_URL` | USGS GeoJSON query |
//! | `QUAKE_FEED_TIMEOUT_SECS` | `10` |
//! | `QUAKE_INGEST_INTERVAL_SECS` | `120` (`0` runs once at startup) |
//! | `QUAKE_FAILURE_POLICY` | `log` (`exit` terminates on a failed cycle) |
//! | `QUAKE_MIN_MAGNITUDE` | unset (no filter); `default` means 4.0 |
//! | `QUAKE_RANDOM_INTERVAL_SECS` | unset (random generator disabled) |

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use quake_ingest::{FailurePolicy, USGS_FEED_URL};
use quake_types::filter::{RecordPolicy, DEFAULT_MIN_MAGNITUDE};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub store_url: String,
    pub store_timeout: Duration,
    pub feed_url: String,
    pub feed_timeout: Duration,
    /// `None` runs ingestion once at startup.
    pub ingest_interval: Option<Duration>,
    pub failure_policy: FailurePolicy,
    pub policy: RecordPolicy,
    /// `None` keeps the in-process random generator off.
    pub random_interval: Option<Duration>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ingest_secs: u64 = parse_or(&get, "QUAKE_INGEST_INTERVAL_SECS", 120)?;
        let random_interval = match get("QUAKE_RANDOM_INTERVAL_SECS") {
            Some(raw) => Some(Duration::from_secs(parse("QUAKE_RANDOM_INTERVAL_SECS", &raw)?)),
            None => None,
        };

        Ok(Self {
            bind: parse_or(&get, "QUAKE_BIND", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(&get, "QUAKE_PORT", 8080)?,
            store_url: get("QUAKE_STORE_URL").unwrap_or_else(|| {
                info!("QUAKE_STORE_URL not set, using default: sqlite://quakes.db");
                "sqlite://quakes.db".to_string()
            }),
            store_timeout: Duration::from_secs(parse_or(&get, "QUAKE_STORE_TIMEOUT_SECS", 5)?),
            feed_url: get("QUAKE_FEED_URL").unwrap_or_else(|| USGS_FEED_URL.to_string()),
            feed_timeout: Duration::from_secs(parse_or(&get, "QUAKE_FEED_TIMEOUT_SECS", 10)?),
            ingest_interval: (ingest_secs > 0).then(|| Duration::from_secs(ingest_secs)),
            failure_policy: parse_or(&get, "QUAKE_FAILURE_POLICY", FailurePolicy::Log)?,
            policy: parse_policy(get("QUAKE_MIN_MAGNITUDE"))?,
            random_interval,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Base URL in-process generators use to reach this gateway.
    pub fn loopback_url(&self) -> String {
        loopback_url_for(self.socket_addr())
    }
}

/// `http://host:port` for a bound address, mapping wildcard binds to loopback.
pub fn loopback_url_for(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

fn parse_policy(raw: Option<String>) -> Result<RecordPolicy, ConfigError> {
    const KEY: &str = "QUAKE_MIN_MAGNITUDE";

    let Some(raw) = raw else {
        return Ok(RecordPolicy::unfiltered());
    };

    match raw.to_ascii_lowercase().as_str() {
        "off" | "none" => Ok(RecordPolicy::unfiltered()),
        "default" => Ok(RecordPolicy::at_least(DEFAULT_MIN_MAGNITUDE)),
        _ => {
            let threshold: f64 = parse(KEY, &raw)?;
            if !threshold.is_finite() {
                return Err(ConfigError::Invalid {
                    key: KEY,
                    value: raw,
                    reason: "threshold must be a finite number".to_string(),
                });
            }
            Ok(RecordPolicy::at_least(threshold))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.socket_addr(), "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store_url, "sqlite://quakes.db");
        assert_eq!(config.store_timeout, Duration::from_secs(5));
        assert_eq!(config.feed_url, USGS_FEED_URL);
        assert_eq!(config.ingest_interval, Some(Duration::from_secs(120)));
        assert_eq!(config.failure_policy, FailurePolicy::Log);
        assert_eq!(config.policy, RecordPolicy::unfiltered());
        assert_eq!(config.random_interval, None);
        assert_eq!(config.loopback_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("QUAKE_PORT", "9000"),
            ("QUAKE_BIND", "127.0.0.1"),
            ("QUAKE_STORE_URL", "memory://"),
            ("QUAKE_INGEST_INTERVAL_SECS", "0"),
            ("QUAKE_FAILURE_POLICY", "exit"),
            ("QUAKE_MIN_MAGNITUDE", "default"),
            ("QUAKE_RANDOM_INTERVAL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.store_url, "memory://");
        assert_eq!(config.ingest_interval, None);
        assert_eq!(config.failure_policy, FailurePolicy::Exit);
        assert_eq!(config.policy, RecordPolicy::at_least(4.0));
        assert_eq!(config.random_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.loopback_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_loopback_for_wildcard_binds() {
        assert_eq!(
            loopback_url_for("[::]:8080".parse::<SocketAddr>().unwrap()),
            "http://[::1]:8080"
        );
        assert_eq!(
            loopback_url_for("10.0.0.5:81".parse::<SocketAddr>().unwrap()),
            "http://10.0.0.5:81"
        );
    }

    #[test]
    fn test_explicit_threshold_and_blank_values() {
        let config = config(&[("QUAKE_MIN_MAGNITUDE", "2.5"), ("QUAKE_PORT", "  ")]).unwrap();
        assert_eq!(config.policy, RecordPolicy::at_least(2.5));
        assert_eq!(config.port, 8080);

        let config = self::config(&[("QUAKE_MIN_MAGNITUDE", "off")]).unwrap();
        assert_eq!(config.policy, RecordPolicy::unfiltered());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = config(&[("QUAKE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUAKE_PORT", .. }));

        let err = config(&[("QUAKE_FAILURE_POLICY", "panic")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUAKE_FAILURE_POLICY", .. }));

        let err = config(&[("QUAKE_MIN_MAGNITUDE", "NaN")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "QUAKE_MIN_MAGNITUDE", .. }));
    }
}
