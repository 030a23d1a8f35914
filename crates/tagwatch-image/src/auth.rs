//! Pull-scoped bearer tokens
//!
//! Every family requests an anonymous token from one or more token
//! endpoints, tried in order until one answers with a token. A missing token
//! is not an error for the caller: many registries serve public manifests
//! without one.

use crate::error::{RegistryError, Result};
use crate::reference::pull_scope;
use crate::registry::{RegistryClient, RegistryFamily};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, trace};

/// Bearer token plus the scope it was issued for.
///
/// Requested per check and never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    scope: String,
}

impl AuthToken {
    pub fn new(token: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Token endpoint body. Docker's token server sends both fields; others send one.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Option<String> {
        self.token
            .filter(|t| !t.is_empty())
            .or(self.access_token.filter(|t| !t.is_empty()))
    }
}

/// Ordered list of candidate URLs; the first one that yields a value wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    candidates: Vec<String>,
}

impl FallbackChain {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Try each candidate in order with `attempt`, returning the first success
    /// or the last failure
    pub async fn first_success<T, F, Fut>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut(String) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last = None;
        for url in &self.candidates {
            match attempt(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    trace!("Candidate {} failed: {}", url, e);
                    last = Some(e);
                }
            }
        }

        Err(match last {
            Some(e) if self.candidates.len() == 1 => e,
            Some(e) => RegistryError::NoTokenEndpoint {
                attempts: self.candidates.len(),
                last: e.to_string(),
            },
            None => RegistryError::NoTokenEndpoint {
                attempts: 0,
                last: "no candidates".to_string(),
            },
        })
    }
}

impl RegistryClient {
    /// Obtain a pull token for `repository`, or `None` if every endpoint failed.
    ///
    /// Never errors: the reason for a missing token is logged at debug level.
    pub async fn obtain_token(
        &self,
        family: &RegistryFamily,
        repository: &str,
    ) -> Option<AuthToken> {
        match self.try_obtain_token(family, repository).await {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("No {} token for {}: {}", family.name(), repository, e);
                None
            }
        }
    }

    /// Obtain a pull token, reporting why it could not be obtained
    pub async fn try_obtain_token(
        &self,
        family: &RegistryFamily,
        repository: &str,
    ) -> Result<AuthToken> {
        let chain = FallbackChain::new(self.endpoints.token_urls(family, repository));
        let scope = pull_scope(repository);

        trace!(
            "Trying {} token endpoint(s) for {}",
            chain.candidates().len(),
            scope
        );
        let token = chain.first_success(|url| self.fetch_token(url)).await?;
        debug!("Obtained {} token for {}", family.name(), scope);
        Ok(AuthToken::new(token, scope))
    }

    /// One GET against one token endpoint
    async fn fetch_token(&self, url: String) -> Result<String> {
        trace!("Requesting token from: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::from_reqwest(&url, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RegistryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| RegistryError::InvalidTokenResponse {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

        body.into_token()
            .ok_or_else(|| RegistryError::InvalidTokenResponse {
                url,
                message: "no token field".to_string(),
            })
    }
}
