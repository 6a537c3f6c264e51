use anyhow::{bail, Result};

pub const CONSUMER_KEY_VAR: &str = "TWITTER_CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "TWITTER_CONSUMER_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_OAUTH_TOKEN";
pub const ACCESS_TOKEN_SECRET_VAR: &str = "TWITTER_OAUTH_TOKEN_SECRET";

/// OAuth 1.0a credentials for the reference API. All four values are
/// required; a missing one is fatal before any network call is attempted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    /// Read all four credential values from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => bail!("missing credential: set {key}"),
            }
        };

        Ok(Self {
            consumer_key: get(CONSUMER_KEY_VAR)?,
            consumer_secret: get(CONSUMER_SECRET_VAR)?,
            access_token: get(ACCESS_TOKEN_VAR)?,
            access_token_secret: get(ACCESS_TOKEN_SECRET_VAR)?,
        })
    }
}
