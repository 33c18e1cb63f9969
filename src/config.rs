// MIT License - Copyright (c) 2026 Peter Wright
// Bridge configuration: endpoint, session key, tuning

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::constants::DEFAULT_PORT;
use crate::error::{BridgeError, Result};

/// Network address of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// The two halves of the controller's shared session key.
///
/// Each half is 8 bytes written as 16 hex digits; `-`, `:` and spaces
/// between digit pairs are accepted.
#[derive(Debug, Clone)]
pub struct Credentials {
    key1: SecretString,
    key2: SecretString,
}

impl Credentials {
    pub fn new(key1: impl Into<String>, key2: impl Into<String>) -> Self {
        Self {
            key1: SecretString::from(key1.into()),
            key2: SecretString::from(key2.into()),
        }
    }

    /// Combined key in the `key1:key2` form expected by the client.
    pub fn combined(&self) -> SecretString {
        SecretString::from(format!(
            "{}:{}",
            self.key1.expose_secret(),
            self.key2.expose_secret()
        ))
    }

    /// Decode both halves into the 16-byte session key.
    pub fn key_bytes(&self) -> Result<[u8; 16]> {
        let mut out = [0u8; 16];
        let first = decode_key_half(self.key1.expose_secret(), "key1")?;
        let second = decode_key_half(self.key2.expose_secret(), "key2")?;
        out[..8].copy_from_slice(&first);
        out[8..].copy_from_slice(&second);
        Ok(out)
    }
}

fn decode_key_half(half: &str, which: &str) -> Result<[u8; 8]> {
    let digits = half
        .chars()
        .filter(|c| !matches!(c, '-' | ':' | ' '))
        .map(|c| {
            c.to_digit(16)
                .ok_or_else(|| BridgeError::Config(format!("{} is not hexadecimal", which)))
        })
        .collect::<Result<Vec<u32>>>()?;
    if digits.len() != 16 {
        return Err(BridgeError::Config(format!(
            "{} must contain 16 hex digits, found {}",
            which,
            digits.len()
        )));
    }
    let mut out = [0u8; 8];
    for (byte, pair) in out.iter_mut().zip(digits.chunks_exact(2)) {
        // both digits are below 16
        *byte = (pair[0] * 16 + pair[1]) as u8;
    }
    Ok(out)
}

/// Configuration for a bridge to one controller.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Controller endpoint
    pub endpoint: Endpoint,
    /// Shared session key
    pub credentials: Credentials,
    /// Timeout applied by `Session::request`; None waits for the controller
    pub request_timeout: Option<Duration>,
    /// Capacity of the inbound notification channel
    pub notification_buffer: usize,
    /// Extra connection attempts made by `OmniBridge::activate`
    pub max_connect_retries: u32,
    /// Base delay between connection attempts, doubled per attempt
    pub reconnect_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::new("192.168.0.100", DEFAULT_PORT),
            credentials: Credentials::new(String::new(), String::new()),
            request_timeout: None,
            notification_buffer: default_notification_buffer(),
            max_connect_retries: default_max_connect_retries(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl BridgeConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Parse a TOML document into a validated config.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: BridgeToml = toml::from_str(text)?;
        let config = raw.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values that can never connect.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.host.trim().is_empty() {
            return Err(BridgeError::Config("host must not be empty".into()));
        }
        if self.endpoint.port == 0 {
            return Err(BridgeError::Config("port must not be 0".into()));
        }
        if self.notification_buffer == 0 {
            return Err(BridgeError::Config("notification_buffer must be at least 1".into()));
        }
        self.credentials.key_bytes()?;
        Ok(())
    }
}

/// Builder for BridgeConfig.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.endpoint.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.endpoint.port = port;
        self
    }

    pub fn keys(mut self, key1: impl Into<String>, key2: impl Into<String>) -> Self {
        self.config.credentials = Credentials::new(key1, key2);
        self
    }

    pub fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn notification_buffer(mut self, capacity: usize) -> Self {
        self.config.notification_buffer = capacity;
        self
    }

    pub fn max_connect_retries(mut self, retries: u32) -> Self {
        self.config.max_connect_retries = retries;
        self
    }

    pub fn reconnect_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.reconnect_delay_ms = delay_ms;
        self
    }

    pub fn build(self) -> BridgeConfig {
        self.config
    }
}

/// On-disk form of the config.
#[derive(Debug, Deserialize)]
struct BridgeToml {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    key1: String,
    key2: String,
    /// 0 leaves requests without a timeout
    #[serde(default)]
    request_timeout_ms: u64,
    #[serde(default = "default_notification_buffer")]
    notification_buffer: usize,
    #[serde(default = "default_max_connect_retries")]
    max_connect_retries: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    reconnect_delay_ms: u64,
}

impl BridgeToml {
    fn into_config(self) -> BridgeConfig {
        let timeout = (self.request_timeout_ms > 0)
            .then(|| Duration::from_millis(self.request_timeout_ms));
        BridgeConfig::builder()
            .host(self.host)
            .port(self.port)
            .keys(self.key1, self.key2)
            .request_timeout(timeout)
            .notification_buffer(self.notification_buffer)
            .max_connect_retries(self.max_connect_retries)
            .reconnect_delay_ms(self.reconnect_delay_ms)
            .build()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_notification_buffer() -> usize {
    256
}
fn default_max_connect_retries() -> u32 {
    3
}
fn default_reconnect_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY1: &str = "00-11-22-33-44-55-66-77";
    const KEY2: &str = "8899aabbccddeeff";

    #[test]
    fn test_config_builder() {
        let config = BridgeConfig::builder()
            .host("10.0.0.5")
            .port(4370)
            .keys(KEY1, KEY2)
            .request_timeout(Some(Duration::from_millis(1500)))
            .build();

        assert_eq!(config.endpoint, Endpoint::new("10.0.0.5", 4370));
        assert_eq!(config.endpoint.to_string(), "10.0.0.5:4370");
        assert_eq!(config.request_timeout, Some(Duration::from_millis(1500)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults() {
        let config = BridgeConfig::builder().build();
        assert_eq!(config.endpoint.port, DEFAULT_PORT);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.notification_buffer, 256);
        assert_eq!(config.max_connect_retries, 3);
        // no keys configured
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_key_bytes() {
        let creds = Credentials::new(KEY1, KEY2);
        let key = creds.key_bytes().unwrap();
        assert_eq!(key[0], 0x00);
        assert_eq!(key[7], 0x77);
        assert_eq!(key[8], 0x88);
        assert_eq!(key[15], 0xff);
        assert_eq!(
            creds.combined().expose_secret(),
            "00-11-22-33-44-55-66-77:8899aabbccddeeff"
        );
    }

    #[test]
    fn test_key_validation() {
        assert!(Credentials::new("0011", KEY2).key_bytes().is_err());
        assert!(Credentials::new("zz11223344556677", KEY2).key_bytes().is_err());
        // 16 bytes but only 15 characters
        let err = BridgeConfig::builder()
            .keys("0\u{e9}0000000000000", KEY2)
            .build()
            .validate()
            .unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new(KEY1, KEY2);
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("8899aabbccddeeff"));
    }

    #[test]
    fn test_from_toml() {
        let config = BridgeConfig::from_toml_str(
            r#"
            host = "omni.local"
            key1 = "00-11-22-33-44-55-66-77"
            key2 = "88-99-AA-BB-CC-DD-EE-FF"
            request_timeout_ms = 2000
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint, Endpoint::new("omni.local", 4369));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.notification_buffer, 256);
    }

    #[test]
    fn test_from_toml_errors() {
        let err = BridgeConfig::from_toml_str("host = \"x\"").unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));

        let err = BridgeConfig::from_toml_str(
            "host = \"\"\nkey1 = \"0011223344556677\"\nkey2 = \"0011223344556677\"",
        )
        .unwrap_err();
        assert!(err.to_string().contains("host"));
    }
}
