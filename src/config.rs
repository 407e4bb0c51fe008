// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration.
//!
//! The host hands the integration a JSON document with camelCase keys:
//!
//! ```json
//! {
//!   "name": "Midea",
//!   "interval": 30,
//!   "appCredentials": "NetHomePlus",
//!   "humidity": { "min": 35, "max": 85 },
//!   "temperature": { "min": 17, "max": 30, "step": 1 },
//!   "republishDelayMs": 50,
//!   "devices": [
//!     {
//!       "deviceId": "150633093847123",
//!       "config": { "name": "Basement", "ip": "192.168.1.40", "token": "...", "key": "...", "type": 161 }
//!     }
//!   ]
//! }
//! ```
//!
//! Every key is optional. [`PlatformConfig::sync_settings`] turns the loaded
//! document into the [`SyncSettings`] the device manager runs with.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::event::DeviceId;
use crate::manager::DeviceContext;

const DEFAULT_INTERVAL_SECS: u64 = 30;
const DEFAULT_REPUBLISH_DELAY_MS: u64 = 50;

/// Top-level platform configuration.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use midea_lan::config::{AppProfile, PlatformConfig};
///
/// let config = PlatformConfig::from_json(r#"{ "interval": 10 }"#).unwrap();
///
/// assert_eq!(config.interval, 10);
/// assert_eq!(config.app_credentials, AppProfile::NetHomePlus);
/// assert_eq!(config.sync_settings().unwrap().interval, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformConfig {
    /// Platform display name.
    pub name: String,
    /// Seconds between two polls of the same device.
    pub interval: u64,
    /// Cloud application profile used to obtain device credentials.
    pub app_credentials: AppProfile,
    /// Device-side humidity bounds.
    pub humidity: HumidityLimits,
    /// Host-facing temperature slider.
    pub temperature: TemperatureLimits,
    /// Delay before a clamped value is pushed back to the host.
    pub republish_delay_ms: u64,
    /// Previously discovered devices.
    pub devices: Vec<DeviceEntry>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: "Midea".to_string(),
            interval: DEFAULT_INTERVAL_SECS,
            app_credentials: AppProfile::default(),
            humidity: HumidityLimits::default(),
            temperature: TemperatureLimits::default(),
            republish_delay_ms: DEFAULT_REPUBLISH_DELAY_MS,
            devices: Vec::new(),
        }
    }
}

impl PlatformConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Json`] if it does not match the schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Validates the configuration and derives the runtime settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] if a bound is inverted or the
    /// poll interval is zero.
    pub fn sync_settings(&self) -> Result<SyncSettings, ConfigError> {
        let settings = SyncSettings {
            interval: Duration::from_secs(self.interval),
            republish_delay: Duration::from_millis(self.republish_delay_ms),
            humidity: self.humidity,
            temperature: self.temperature,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Returns the credentials of the configured cloud profile.
    #[must_use]
    pub fn credentials(&self) -> &'static AppCredentials {
        self.app_credentials.credentials()
    }

    /// Converts the persisted device list into registration contexts.
    #[must_use]
    pub fn device_contexts(&self) -> Vec<DeviceContext> {
        self.devices.iter().cloned().map(DeviceContext::from).collect()
    }
}

/// Runtime settings shared by every device session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    /// Time between two polls of the same device.
    pub interval: Duration,
    /// Delay before a clamped value is pushed back to the host.
    pub republish_delay: Duration,
    /// Device-side humidity bounds.
    pub humidity: HumidityLimits,
    /// Host-facing temperature slider.
    pub temperature: TemperatureLimits,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            republish_delay: Duration::from_millis(DEFAULT_REPUBLISH_DELAY_MS),
            humidity: HumidityLimits::default(),
            temperature: TemperatureLimits::default(),
        }
    }
}

impl SyncSettings {
    /// Sets the poll interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the republish delay.
    #[must_use]
    pub fn with_republish_delay(mut self, delay: Duration) -> Self {
        self.republish_delay = delay;
        self
    }

    /// Sets the humidity bounds.
    #[must_use]
    pub fn with_humidity(mut self, humidity: HumidityLimits) -> Self {
        self.humidity = humidity;
        self
    }

    /// Checks that the settings can drive a device manager.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] if a bound is inverted or not
    /// finite, or the poll interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.humidity.validate()?;
        self.temperature.validate()?;
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidRange {
                field: "interval",
                min: 1.0,
                max: 0.0,
            });
        }
        Ok(())
    }
}

/// Bounds applied to the humidity set point before it reaches the device.
///
/// The host slider always spans 0..100 so that the value shown matches the
/// value requested; out-of-bounds requests are clamped here instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumidityLimits {
    /// Lowest accepted target humidity.
    pub min: f64,
    /// Highest accepted target humidity.
    pub max: f64,
}

impl Default for HumidityLimits {
    fn default() -> Self {
        Self {
            min: 35.0,
            max: 85.0,
        }
    }
}

impl HumidityLimits {
    /// Clamps `value` into the bounds.
    ///
    /// Never panics: with inverted bounds the result is `max`.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                field: "humidity",
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Range and step of the host's temperature threshold slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureLimits {
    /// Lowest selectable threshold.
    pub min: f64,
    /// Highest selectable threshold.
    pub max: f64,
    /// Slider step.
    pub step: f64,
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            min: 17.0,
            max: 30.0,
            step: 1.0,
        }
    }
}

impl TemperatureLimits {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max && self.step > 0.0
        {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                field: "temperature",
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// A device as persisted in the configuration's `devices` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    /// Appliance id.
    pub device_id: DeviceId,
    /// Connection details.
    pub config: DeviceEntryConfig,
}

/// Connection details of a persisted device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntryConfig {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// LAN address.
    #[serde(alias = "address")]
    pub ip: String,
    /// Session token.
    #[serde(default)]
    pub token: String,
    /// Session key.
    #[serde(default)]
    pub key: String,
    /// Appliance type code (`161`, `172`). Discovery notation such as
    /// `"dh"` or `"0xac"` is accepted on input.
    #[serde(rename = "type", deserialize_with = "crate::types::deserialize_type_code")]
    pub kind: u32,
}

impl From<DeviceEntry> for DeviceContext {
    fn from(entry: DeviceEntry) -> Self {
        Self {
            device_id: entry.device_id,
            kind: entry.config.kind,
            name: entry.config.name,
            address: entry.config.ip,
            token: entry.config.token,
            key: entry.config.key,
        }
    }
}

impl From<&DeviceContext> for DeviceEntry {
    fn from(context: &DeviceContext) -> Self {
        Self {
            device_id: context.device_id.clone(),
            config: DeviceEntryConfig {
                name: context.name.clone(),
                ip: context.address.clone(),
                token: context.token.clone(),
                key: context.key.clone(),
                kind: context.kind,
            },
        }
    }
}

/// Cloud application profile used to log in and obtain device credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppProfile {
    /// `NetHome Plus` application.
    #[default]
    NetHomePlus,
    /// `Midea Air` application.
    MideaAir,
    /// `MSmartHome` application.
    MSmartHome,
}

impl AppProfile {
    /// Returns the profile's static credentials.
    #[must_use]
    pub fn credentials(self) -> &'static AppCredentials {
        match self {
            Self::NetHomePlus => &NET_HOME_PLUS,
            Self::MideaAir => &MIDEA_AIR,
            Self::MSmartHome => &MSMART_HOME,
        }
    }
}

impl std::str::FromStr for AppProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NetHomePlus" => Ok(Self::NetHomePlus),
            "MideaAir" => Ok(Self::MideaAir),
            "MSmartHome" => Ok(Self::MSmartHome),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

/// Static credentials of a cloud application profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppCredentials {
    /// Application key.
    pub app_key: &'static str,
    /// Application id.
    pub app_id: u32,
    /// Cloud API base URL.
    pub api_url: &'static str,
    /// Request signing key.
    pub sign_key: &'static str,
    /// IoT key, proxied profiles only.
    pub iot_key: Option<&'static str>,
    /// HMAC key, proxied profiles only.
    pub hmac_key: Option<&'static str>,
    /// Proxy API version, if any.
    pub proxied: Option<&'static str>,
}

const SIGN_KEY: &str = "xhdiwjnchekd4d512chdjx5d8e4c394D2D7S";

static NET_HOME_PLUS: AppCredentials = AppCredentials {
    app_key: "3742e9e5842d4ad59c2db887e12449f9",
    app_id: 1017,
    api_url: "https://mapp.appsmb.com",
    sign_key: SIGN_KEY,
    iot_key: None,
    hmac_key: None,
    proxied: None,
};

static MIDEA_AIR: AppCredentials = AppCredentials {
    app_key: "ff0cf6f5f0c3471de36341cab3f7a9af",
    app_id: 1117,
    api_url: "https://mapp.appsmb.com",
    sign_key: SIGN_KEY,
    iot_key: None,
    hmac_key: None,
    proxied: None,
};

static MSMART_HOME: AppCredentials = AppCredentials {
    app_key: "ac21b9f9cbfe4ca5a88562ef25e2b768",
    app_id: 1010,
    api_url: "https://mp-prod.appsmb.com/mas/v5/app/proxy?alias=",
    sign_key: SIGN_KEY,
    iot_key: Some("meicloud"),
    hmac_key: Some("PROD_VnoClJI9aikS8dyy"),
    proxied: Some("v5"),
};
