//! Habitica v3 API client.
//!
//! Two operations: fetch the looking-for-party candidate list, and submit
//! a batch party invite. Both carry the `x-api-user`/`x-api-key` identity
//! headers plus the fixed `x-client` identifier Habitica requires of
//! third-party tools.

use crate::config::ApiIdentity;
use crate::error::{InviteError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://habitica.com/api/v3";

/// Fixed client identifier sent with every request.
const X_CLIENT: &str = "b6ae607d-ad3b-4086-ae5a-e511c4cb24d7-AutoPartyInvites";

/// Hard timeout on the candidate fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A user advertising looking-for-party status, as returned by the API.
///
/// Nested objects default when absent so one sparse profile cannot fail
/// deserialization of the whole list.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Habitica user id.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Character stats (level, class).
    #[serde(default)]
    pub stats: CandidateStats,
    /// Cumulative login-incentive count.
    #[serde(rename = "loginIncentives", default)]
    pub login_incentives: u32,
    /// User preferences (language).
    #[serde(default)]
    pub preferences: CandidatePreferences,
    /// Public profile (display name).
    #[serde(default)]
    pub profile: CandidateProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateStats {
    #[serde(default)]
    pub lvl: u32,
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePreferences {
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
}

/// Response envelope for the LFP fetch.
#[derive(Debug, Deserialize)]
struct FetchEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<Candidate>,
}

/// Response envelope for the invite POST.
#[derive(Debug, Deserialize)]
struct InviteEnvelope {
    #[serde(default)]
    success: bool,
}

/// Client for the two Habitica operations this tool needs.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    admin: ApiIdentity,
    inviter: Option<ApiIdentity>,
}

impl ApiClient {
    /// Create a client. `inviter`, when present, is used for the invite
    /// call only; the fetch always uses the admin identity.
    pub fn new(admin: ApiIdentity, inviter: Option<ApiIdentity>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            admin,
            inviter,
        }
    }

    /// Override the API root (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn identified(
        &self,
        builder: reqwest::RequestBuilder,
        identity: &ApiIdentity,
    ) -> reqwest::RequestBuilder {
        builder
            .header("content-type", "application/json")
            .header("x-client", X_CLIENT)
            .header("x-api-user", &identity.api_user)
            .header("x-api-key", &identity.api_key)
    }

    /// Fetch the current looking-for-party user list.
    ///
    /// Network failure, timeout, a non-success HTTP status, or a response
    /// envelope with `success: false` all yield [`InviteError::Fetch`].
    pub async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        let url = format!("{}/looking-for-party", self.base_url);
        let response = self
            .identified(self.http.get(&url), &self.admin)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| InviteError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InviteError::Fetch(format!(
                "LFP request returned {}",
                response.status()
            )));
        }

        let envelope: FetchEnvelope = response
            .json()
            .await
            .map_err(|e| InviteError::Fetch(format!("invalid LFP response: {e}")))?;

        if !envelope.success {
            return Err(InviteError::Fetch(
                "request failed, please check your API user and key".to_owned(),
            ));
        }

        Ok(envelope.data)
    }

    /// Submit one batch party invite for the given user ids.
    ///
    /// All-or-nothing at call granularity: any failure leaves the caller's
    /// ledger untouched even if the remote side partially processed the
    /// batch.
    pub async fn submit_invites(&self, ids: &[String]) -> Result<()> {
        let url = format!("{}/groups/party/invite", self.base_url);
        let identity = self.inviter.as_ref().unwrap_or(&self.admin);
        let body = serde_json::json!({ "uuids": ids });

        let response = self
            .identified(self.http.post(&url), identity)
            .json(&body)
            .send()
            .await
            .map_err(|e| InviteError::Invite(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InviteError::Invite(format!(
                "invite request returned {status}: {body}"
            )));
        }

        let envelope: InviteEnvelope = response
            .json()
            .await
            .map_err(|e| InviteError::Invite(format!("invalid invite response: {e}")))?;

        if !envelope.success {
            return Err(InviteError::Invite(
                "invite request reported failure".to_owned(),
            ));
        }

        Ok(())
    }
}
