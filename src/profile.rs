use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::{error::ProfileError, models::Profile};

// 1. ProfileService Contract
/// ProfileService
///
/// The session collaborator's profile lookup. Handlers and the session extractor
/// depend on this trait only, so the member API client can be swapped for the
/// in-memory service in local development and tests.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Looks a member up by handle. `Ok(None)` means the member does not exist;
    /// `Err` means the lookup could not complete.
    async fn get_profile(&self, handle: &str) -> Result<Option<Profile>, ProfileError>;
}

/// ProfileState
///
/// The shared handle stored in the application state.
pub type ProfileState = Arc<dyn ProfileService>;

// 2. The Real Implementation (Member API)
/// MemberApiProfileService
///
/// Fetches `{base_url}/members/{handle}` and expects a `Profile` JSON body.
#[derive(Clone)]
pub struct MemberApiProfileService {
    client: reqwest::Client,
    base_url: Url,
}

impl MemberApiProfileService {
    /// new
    ///
    /// Builds the HTTP client. The timeout bounds every lookup, so a slow member
    /// API surfaces as an error instead of a hung request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProfileError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ProfileError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ProfileError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn member_url(&self, handle: &str) -> Result<Url, ProfileError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProfileError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("members")
            .push(handle);
        Ok(url)
    }
}

#[async_trait]
impl ProfileService for MemberApiProfileService {
    async fn get_profile(&self, handle: &str) -> Result<Option<Profile>, ProfileError> {
        let url = self.member_url(handle)?;
        debug!(%url, "fetching member profile");

        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<Profile>().await?)),
            status => Err(ProfileError::Upstream(status.as_u16())),
        }
    }
}

// 3. The In-Memory Implementation (Local Development and Tests)
/// InMemoryProfileService
///
/// Profiles keyed by lower-cased handle; handles are case-insensitive.
#[derive(Clone, Default)]
pub struct InMemoryProfileService {
    profiles: HashMap<String, Profile>,
    /// When true, every lookup fails as if the member API were down.
    pub should_fail: bool,
}

impl InMemoryProfileService {
    pub fn new<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = Profile>,
    {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.handle.to_lowercase(), profile))
                .collect(),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            profiles: HashMap::new(),
            should_fail: true,
        }
    }

    /// demo
    ///
    /// A handful of members covering each access level, for local runs.
    pub fn demo() -> Self {
        Self::new([
            Profile {
                user_id: 1001,
                handle: "member".to_string(),
                roles: vec![crate::models::MEMBER_ROLE.to_string()],
            },
            Profile {
                user_id: 1002,
                handle: "customer".to_string(),
                roles: vec![crate::models::CUSTOMER_ROLE.to_string()],
            },
            Profile {
                user_id: 1003,
                handle: "badger".to_string(),
                roles: vec![
                    crate::models::MEMBER_ROLE.to_string(),
                    crate::tools::gamification_admin::ADMIN_ROLE.to_string(),
                ],
            },
            Profile {
                user_id: 1004,
                handle: "admin".to_string(),
                roles: vec![crate::models::ADMIN_ROLE.to_string()],
            },
        ])
    }
}

#[async_trait]
impl ProfileService for InMemoryProfileService {
    async fn get_profile(&self, handle: &str) -> Result<Option<Profile>, ProfileError> {
        if self.should_fail {
            return Err(ProfileError::Unavailable(
                "in-memory profile service set to fail".to_string(),
            ));
        }
        Ok(self.profiles.get(&handle.to_lowercase()).cloned())
    }
}
