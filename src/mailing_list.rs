//! A thin client for a MailerLite compatible mailing-list API.

use std::fmt;

use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::web::types::ValidEmail;

/// Status sent with every upsert, it re-activates addresses that unsubscribed before.
const ACTIVE_STATUS: &str = "active";

#[derive(Debug)]
pub struct MailingListClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    api_key: SecretString,
}

impl MailingListClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        api_key: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url =
            reqwest::Url::parse(url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(MailingListClient {
            http_client,
            url,
            api_key,
        })
    }

    /// Creates the subscriber, or updates it if the provider already knows the address.
    /// The returned record may lack an id; callers decide what that means.
    pub async fn create_or_update_subscriber(
        &self,
        email: &ValidEmail,
    ) -> Result<SubscriberRecord> {
        let url = self.endpoint("api/subscribers")?;

        let body = SubscriberUpsert {
            email: email.as_ref(),
            status: ACTIVE_STATUS,
        };

        let envelope: Envelope<SubscriberRecord> = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(envelope.data.unwrap_or_default())
    }

    pub async fn assign_subscriber_to_group(
        &self,
        subscriber_id: &SubscriberId,
        group_id: &GroupId,
    ) -> Result<()> {
        let url = self.endpoint(&format!(
            "api/subscribers/{}/groups/{}",
            subscriber_id.as_ref(),
            group_id.as_ref()
        ))?;

        let _resp = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url> {
        self.url
            .join(path)
            .map_err(|e| Error::UrlParsing(e.to_string()))
    }
}

#[derive(Serialize)]
struct SubscriberUpsert<'a> {
    email: &'a str,
    status: &'a str,
}

/// Every provider response wraps its payload in a `data` field.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: Option<T>,
}

/// The part of the provider's subscriber resource we care about.
#[derive(Deserialize, Debug, Default)]
pub struct SubscriberRecord {
    #[serde(default)]
    id: Option<RawId>,
}

impl SubscriberRecord {
    /// Empty strings, `0` and anything that is not path-safe count as a missing id.
    pub fn id(&self) -> Option<SubscriberId> {
        match self.id.as_ref()? {
            RawId::Text(id) => SubscriberId::parse(id).ok(),
            RawId::Number(0) => None,
            RawId::Number(id) => SubscriberId::parse(id.to_string()).ok(),
            RawId::Other(_) => None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
    // Anything else must not fail the whole response.
    Other(serde::de::IgnoredAny),
}

/// Subscriber id assigned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberId(String);

/// Group (segment) id within the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupId(String);

impl SubscriberId {
    pub fn parse<S: AsRef<str>>(value: S) -> Result<Self> {
        parse_path_segment(value.as_ref()).map(SubscriberId)
    }
}

impl GroupId {
    pub fn parse<S: AsRef<str>>(value: S) -> Result<Self> {
        parse_path_segment(value.as_ref()).map(GroupId)
    }
}

impl AsRef<str> for SubscriberId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Ids end up inside URL paths.
fn parse_path_segment(value: &str) -> Result<String> {
    let is_valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if is_valid {
        Ok(value.to_owned())
    } else {
        Err(Error::InvalidId(value.to_owned()))
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("invalid id: '{0}'")]
    InvalidId(String),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
