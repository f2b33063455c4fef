//! Session credential and login.

use std::fmt::{self, Debug, Formatter};

use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Cookie carrying the session token on every authenticated request.
pub const SESSION_COOKIE: &str = "jwt";

/// Login endpoint, relative to the API base URL.
pub const LOGIN_PATH: &str = "account/login";

/// Authenticated session against one backend.
///
/// Read-only once built; clone it to share between uploads.
#[derive(Clone)]
pub struct Session {
    base_url: Url,
    token: String,
}

impl Debug for Session {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Session {
    /// Session using a token obtained elsewhere.
    ///
    /// # Errors
    ///
    /// Rejects empty tokens and tokens that cannot be sent in a header.
    pub fn from_token(base_url: Url, token: impl Into<String>) -> ClientResult<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ClientError::InvalidInput {
                field: "token",
                reason: "must not be empty",
            });
        }
        let session = Self { base_url, token };
        session.cookie_header()?;
        Ok(session)
    }

    /// API base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Raw session token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// `Cookie` header value carrying the token.
    ///
    /// # Errors
    ///
    /// Fails when the token contains characters not allowed in headers.
    pub fn cookie_header(&self) -> ClientResult<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", self.token))
            .map_err(|_| ClientError::InvalidInput {
                field: "token",
                reason: "contains characters not allowed in a cookie",
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Resolve `path` beneath the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        endpoint(&self.base_url, path)
    }
}

/// Resolve `path` beneath `base`, keeping any path prefix `base` carries.
///
/// # Errors
///
/// Returns [`ClientError::InvalidUrl`] when the result is not a valid URL.
pub fn endpoint(base: &Url, path: &str) -> ClientResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|source| ClientError::InvalidUrl {
            value: path.to_string(),
            source,
        })
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Exchange a username and password for a [`Session`].
///
/// # Errors
///
/// Returns [`ClientError::AuthenticationFailed`] when the backend answers with
/// anything but `200` carrying a token, and [`ClientError::Http`] when the
/// request cannot be completed.
pub async fn login(
    client: &Client,
    base_url: &Url,
    username: &str,
    password: &str,
) -> ClientResult<Session> {
    let url = endpoint(base_url, LOGIN_PATH)?;
    debug!(url = %url, username, "requesting session token");
    let response = client
        .post(url.clone())
        .json(&LoginRequest { username, password })
        .send()
        .await
        .map_err(|source| ClientError::http("login.send", &url, source))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ClientError::auth("login rejected", Some(status.as_u16())));
    }
    let body: LoginResponse = response
        .json()
        .await
        .map_err(|_| ClientError::auth("login response was not valid json", Some(status.as_u16())))?;
    let token = body
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ClientError::auth("login response carried no token", Some(status.as_u16())))?;

    info!(username, "session established");
    Session::from_token(base_url.clone(), token)
}
