//! Reference gateway speaking the Twitter REST v1.1 API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{Post, SocialGraph, TimelineSource, PAGE_SIZE};
use crate::config::Credentials;
use crate::error::GatewayError;
use crate::oauth::OAuthSigner;

const DEFAULT_API_URL: &str = "https://api.twitter.com";

/// Follow lists are fetched in one request; this is the documented per-request
/// maximum.
const FOLLOW_LIST_MAX: usize = 5000;

/// Error codes the reference API uses for the two recoverable conditions.
const RATE_LIMITED_CODE: i64 = 88;
const TRANSIENT_CODE: i64 = 131;

/// Legacy v1.1 timestamp format, e.g. `Wed Aug 27 13:08:45 +0000 2008`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Clone)]
pub struct TwitterGateway {
    client: reqwest::Client,
    base_url: String,
    signer: OAuthSigner,
}

#[derive(Debug, Deserialize)]
struct FriendIds {
    ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: u64,
    created_at: String,
    user: ApiUser,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    screen_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    code: i64,
    message: String,
}

impl TwitterGateway {
    pub fn new(credentials: &Credentials) -> Result<Self, GatewayError> {
        Self::with_api_url(credentials, DEFAULT_API_URL)
    }

    /// Point the gateway at a non-default API host (tests use a local mock).
    pub fn with_api_url(credentials: &Credentials, api_url: &str) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("feedrank/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: api_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(credentials),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let authorization = self.signer.authorization("GET", &url, params)?;

        debug!(path, "gateway request");
        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        // Non-success bodies carry `{"errors": [{"code", "message"}]}`; the
        // code decides whether the condition is recoverable.
        let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        match body.errors.first() {
            Some(e) if e.code == RATE_LIMITED_CODE => Err(GatewayError::RateLimited),
            Some(e) if e.code == TRANSIENT_CODE => Err(GatewayError::Transient),
            Some(e) => Err(GatewayError::Api {
                status: status.as_u16(),
                message: e.message.clone(),
                code: Some(e.code),
            }),
            None if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                Err(GatewayError::RateLimited)
            }
            None => Err(GatewayError::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
                code: None,
            }),
        }
    }
}

fn parse_created_at(raw: &str) -> Result<DateTime<Utc>, GatewayError> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GatewayError::Payload(format!("bad created_at {raw:?}: {e}")))
}

#[async_trait]
impl SocialGraph for TwitterGateway {
    async fn followed_ids(&self, screen_name: &str) -> Result<Vec<u64>, GatewayError> {
        let params = [
            ("count", FOLLOW_LIST_MAX.to_string()),
            ("screen_name", screen_name.to_string()),
        ];
        let friends: FriendIds = self.get("/1.1/friends/ids.json", &params).await?;
        Ok(friends.ids)
    }
}

#[async_trait]
impl TimelineSource for TwitterGateway {
    async fn fetch_page(
        &self,
        account_id: u64,
        cursor: Option<u64>,
    ) -> Result<Vec<Post>, GatewayError> {
        let mut params = vec![
            ("count", PAGE_SIZE.to_string()),
            ("exclude_replies", "true".to_string()),
            ("include_rts", "true".to_string()),
            ("user_id", account_id.to_string()),
        ];
        // max_id is inclusive in the reference API; subtract one so the page
        // holds only posts strictly older than the cursor.
        if let Some(cursor) = cursor {
            params.push(("max_id", cursor.saturating_sub(1).to_string()));
        }

        let tweets: Vec<ApiTweet> = self.get("/1.1/statuses/user_timeline.json", &params).await?;
        tweets
            .into_iter()
            .map(|tweet| {
                Ok(Post {
                    id: tweet.id,
                    author: tweet.user.screen_name,
                    created_at: parse_created_at(&tweet.created_at)?,
                })
            })
            .collect()
    }
}
