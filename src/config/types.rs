//! The configuration structs used to build the AppConfig, and their impls.
use std::fmt;

use secrecy::SecretString;
use serde::{de, Deserialize, Deserializer};
use strum_macros::AsRefStr;

use crate::{
    analytics::TrackingId,
    config::{ConfigError, ConfigResult},
    mailing_list::GroupId,
};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub mailing_list_config: MailingListConfig,
    #[serde(default)]
    pub analytics_config: AnalyticsConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
    pub base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct MailingListConfig {
    pub url: String,
    #[serde(deserialize_with = "secret_from_scalar")]
    pub api_key: SecretString,
    #[serde(deserialize_with = "string_from_scalar")]
    pub group_id: String,
    pub timeout_millis: u64,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AnalyticsConfig {
    pub tracking_id: Option<String>,
}

// ###################################
// ->   IMPLs
// ###################################
impl MailingListConfig {
    pub fn valid_group(&self) -> ConfigResult<GroupId> {
        GroupId::parse(&self.group_id)
            .map_err(|_| ConfigError::InvalidGroupId(self.group_id.clone()))
    }
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

impl AnalyticsConfig {
    /// `None` means analytics is switched off.
    pub fn valid_tracking_id(&self) -> ConfigResult<Option<TrackingId>> {
        match self.tracking_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(id) => TrackingId::parse(id)
                .map(Some)
                .map_err(|_| ConfigError::InvalidTrackingId(id.to_string())),
        }
    }
}

// ###################################
// ->   DESERIALIZERS
// ###################################
/// Environment variables are parsed by their form, so `APP_MAILING_LIST_CONFIG__GROUP_ID=1183569`
/// arrives as a number. Ids and keys are opaque strings, take any scalar as its text.
fn string_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(ScalarAsString)
}

fn secret_from_scalar<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<SecretString, D::Error> {
    string_from_scalar(deserializer).map(SecretString::from)
}

struct ScalarAsString;

impl de::Visitor<'_> for ScalarAsString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }
    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }
    fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
        Ok(v.to_string())
    }
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }
    fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
        Ok(v.to_string())
    }
    fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
        Ok(v.to_string())
    }
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

// ###################################
// ->   TESTS
// ###################################
