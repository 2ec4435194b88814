//! Agent card discovery.
//!
//! A [`CardResolver`] splits an agent URL into a base (`scheme://host[:port]`)
//! and a card path. A bare host, with or without trailing slash, resolves to
//! the well-known default card; anything with a path is fetched exactly as
//! given.

use reqwest::header::ACCEPT;
use reqwest::Url;

use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;
use crate::utils::constants::{
    DEFAULT_AGENT_CARD_PATH, LEGACY_AGENT_CARD_PATH, WELL_KNOWN_PREFIX,
};

use super::transport::HttpHandle;

/// A fetched agent card, typed and as received.
#[derive(Debug, Clone)]
pub struct ResolvedCard {
    pub card: AgentCard,
    pub raw: serde_json::Value,
}

/// Knows where an agent's card lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardResolver {
    base_url: String,
    agent_card_path: String,
}

impl CardResolver {
    /// Derive a resolver from a user-supplied agent URL.
    ///
    /// ```
    /// use a2a_inspector::client::CardResolver;
    ///
    /// let r = CardResolver::from_url("https://example.com/agent/path").unwrap();
    /// assert_eq!(r.base_url(), "https://example.com");
    /// assert_eq!(r.agent_card_path(), "agent/path");
    ///
    /// let r = CardResolver::from_url("https://example.com/").unwrap();
    /// assert_eq!(r.agent_card_path(), "agent-card.json");
    /// ```
    pub fn from_url(url: &str) -> A2AResult<Self> {
        let invalid = |reason: String| A2AError::InvalidUrl {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("URL has no host".to_string()))?;

        let base_url = match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
            None => format!("{}://{}", parsed.scheme(), host),
        };

        let mut path = parsed.path().trim_matches('/').to_string();
        if let Some(query) = parsed.query() {
            path.push('?');
            path.push_str(query);
        }
        if path.is_empty() {
            path = DEFAULT_AGENT_CARD_PATH.to_string();
        }

        Ok(Self {
            base_url,
            agent_card_path: path,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn agent_card_path(&self) -> &str {
        &self.agent_card_path
    }

    /// Whether no path was given and the well-known location is used.
    pub fn uses_default_path(&self) -> bool {
        self.agent_card_path == DEFAULT_AGENT_CARD_PATH
    }

    /// The first URL [`fetch`](Self::fetch) will try.
    pub fn card_url(&self) -> String {
        if self.uses_default_path() {
            format!("{}/{}{}", self.base_url, WELL_KNOWN_PREFIX, self.agent_card_path)
        } else {
            format!("{}/{}", self.base_url, self.agent_card_path)
        }
    }

    /// Fetch the card through `handle`.
    ///
    /// With the default path, a 404 at `/.well-known/agent-card.json` falls
    /// back to the legacy `/.well-known/agent.json`.
    pub async fn fetch(&self, handle: &HttpHandle) -> A2AResult<ResolvedCard> {
        let primary = self.card_url();
        if !self.uses_default_path() {
            return fetch_card(handle, &primary).await;
        }

        match fetch_card(handle, &primary).await {
            Err(A2AError::Http { status: 404, .. }) => {
                let legacy = format!("{}/{}", self.base_url, LEGACY_AGENT_CARD_PATH);
                tracing::debug!(%primary, %legacy, "agent card not found, trying legacy path");
                fetch_card(handle, &legacy).await
            }
            other => other,
        }
    }
}

async fn fetch_card(handle: &HttpHandle, url: &str) -> A2AResult<ResolvedCard> {
    tracing::debug!(%url, "fetching agent card");

    let response = handle
        .client()?
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| A2AError::from_reqwest(&format!("GET {url}"), e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(A2AError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| A2AError::Transport(format!("failed to read agent card response: {e}")))?;

    let raw: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| A2AError::InvalidJson(format!("agent card is not JSON: {e}")))?;
    let card: AgentCard = serde_json::from_value(raw.clone())
        .map_err(|e| A2AError::InvalidJson(format!("failed to parse agent card: {e}")))?;

    tracing::debug!(name = %card.name, version = %card.version, "resolved agent card");
    Ok(ResolvedCard { card, raw })
}
