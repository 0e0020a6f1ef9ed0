//! Identity domain SCIM client for user listing and status changes.
//!
//! Uses the identity domain admin REST API (`/admin/v1`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};
use url::Url;
use zeroize::Zeroizing;

use super::models::{
    StatusChange, StatusChangeRequest, StatusChangeResponse, UserListResponse, UserRecord,
};
use super::store::IdentityStore;
use crate::error::IdentityError;

/// Users collection path, relative to the domain endpoint.
const USERS_PATH: &str = "admin/v1/Users";

/// User status changer path, relative to the domain endpoint.
const STATUS_CHANGER_PATH: &str = "admin/v1/UserStatusChanger/";

/// 1-based index of the next page to request, or `None` once the listing is complete.
///
/// Stops on an empty page, once `total` users have been collected, or, when the
/// provider reports no total, on a page shorter than `page_size`.
fn next_start_index(
    start_index: u64,
    total: Option<u64>,
    collected: u64,
    received: u64,
    page_size: u32,
) -> Option<u64> {
    if received == 0 {
        return None;
    }
    match total {
        Some(total) if collected >= total => None,
        None if received < u64::from(page_size) => None,
        _ => Some(start_index + received),
    }
}

/// Client settings taken from configuration.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub page_size: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

/// Identity domain API client.
pub struct IdentityDomainClient {
    http_client: Client,
    endpoint: Url,
    access_token: Zeroizing<String>,
    page_size: u32,
}

impl IdentityDomainClient {
    /// Create a new client for the domain at `endpoint`.
    pub fn new(
        endpoint: Url,
        access_token: Zeroizing<String>,
        options: ClientOptions,
    ) -> Result<Self, IdentityError> {
        let http_client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(IdentityError::Network)?;

        Ok(Self {
            http_client,
            endpoint,
            access_token,
            page_size: options.page_size,
        })
    }

    fn url(&self, path: &str) -> Result<Url, IdentityError> {
        self.endpoint
            .join(path)
            .map_err(|e| IdentityError::InvalidResponse(format!("Invalid request URL: {}", e)))
    }

    /// Status changer URL for one user, with the id percent-encoded as a single segment.
    fn status_changer_url(&self, user_id: &str) -> Result<Url, IdentityError> {
        let mut url = self.url(STATUS_CHANGER_PATH)?;
        url.path_segments_mut()
            .map_err(|_| IdentityError::InvalidResponse("Endpoint cannot be a base URL".into()))?
            .pop_if_empty()
            .push(user_id);
        Ok(url)
    }

    /// Fetch one page of users starting at the 1-based `start_index`.
    async fn list_users_page(&self, start_index: u64) -> Result<UserListResponse, IdentityError> {
        let url = self.url(USERS_PATH)?;

        debug!("Fetching users from {} (startIndex {})", url, start_index);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.access_token.as_str())
            .query(&[
                ("attributeSets", "all".to_string()),
                ("sortBy", "userName".to_string()),
                ("sortOrder", "ascending".to_string()),
                ("count", self.page_size.to_string()),
                ("startIndex", start_index.to_string()),
            ])
            .send()
            .await
            .map_err(IdentityError::Network)?;

        let status = response.status();
        match status.as_u16() {
            200 => response
                .json()
                .await
                .map_err(|e| IdentityError::InvalidResponse(e.to_string())),
            401 => Err(IdentityError::Unauthorized),
            403 => Err(IdentityError::Forbidden),
            429 => Err(IdentityError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!("Failed to list users: HTTP {} - {}", status, body);
                Err(IdentityError::InvalidResponse(format!("HTTP {}", status)))
            }
        }
    }
}

#[async_trait]
impl IdentityStore for IdentityDomainClient {
    async fn list_users(&self) -> Result<Vec<UserRecord>, IdentityError> {
        let mut users: Vec<UserRecord> = Vec::new();
        let mut start_index: u64 = 1;

        loop {
            let page = self.list_users_page(start_index).await?;
            let received = page.resources.len() as u64;

            users.extend(page.resources.into_iter().map(UserRecord::from));

            match next_start_index(
                start_index,
                page.total_results,
                users.len() as u64,
                received,
                self.page_size,
            ) {
                Some(next) => start_index = next,
                None => break,
            }
        }

        info!("Fetched {} users from identity domain", users.len());
        Ok(users)
    }

    async fn set_user_active(
        &self,
        user_id: &str,
        active: bool,
    ) -> Result<StatusChange, IdentityError> {
        let url = self.status_changer_url(user_id)?;

        debug!("Setting active={} for user {}", active, user_id);

        let response = self
            .http_client
            .put(url)
            .bearer_auth(self.access_token.as_str())
            .json(&StatusChangeRequest::new(active))
            .send()
            .await
            .map_err(IdentityError::Network)?;

        let status = response.status();
        match status.as_u16() {
            200 | 201 => {
                let body: StatusChangeResponse = response
                    .json()
                    .await
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                Ok(body.into_status_change(active))
            }
            400 => {
                let body = response.text().await.unwrap_or_default();
                warn!("Bad request changing status of {}: {}", user_id, body);
                Err(IdentityError::UpdateFailed("Bad request".to_string()))
            }
            401 => Err(IdentityError::Unauthorized),
            403 => Err(IdentityError::Forbidden),
            404 => Err(IdentityError::NotFound(user_id.to_string())),
            429 => Err(IdentityError::RateLimited),
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!("Status change failed for {}: HTTP {} - {}", user_id, status, body);
                Err(IdentityError::UpdateFailed(format!("HTTP {}", status)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> IdentityDomainClient {
        IdentityDomainClient::new(
            Url::parse("https://idcs-test.identity.oraclecloud.com/").unwrap(),
            Zeroizing::new("token".to_string()),
            ClientOptions {
                page_size: 1000,
                timeout: Duration::from_secs(30),
                connect_timeout: Duration::from_secs(10),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_request_urls() {
        let client = client();
        assert_eq!(
            client.url(USERS_PATH).unwrap().as_str(),
            "https://idcs-test.identity.oraclecloud.com/admin/v1/Users"
        );
        assert_eq!(
            client
                .status_changer_url("ocid1.user.oc1..abc")
                .unwrap()
                .as_str(),
            "https://idcs-test.identity.oraclecloud.com/admin/v1/UserStatusChanger/ocid1.user.oc1..abc"
        );
    }

    #[test]
    fn test_status_changer_url_encodes_id() {
        let client = client();
        let url = client.status_changer_url("a/b?c#d").unwrap();

        assert_eq!(
            url.as_str(),
            "https://idcs-test.identity.oraclecloud.com/admin/v1/UserStatusChanger/a%2Fb%3Fc%23d"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_paging_follows_total_results() {
        // 2500 users in pages of 1000
        assert_eq!(next_start_index(1, Some(2500), 1000, 1000, 1000), Some(1001));
        assert_eq!(next_start_index(1001, Some(2500), 2000, 1000, 1000), Some(2001));
        assert_eq!(next_start_index(2001, Some(2500), 2500, 500, 1000), None);
    }

    #[test]
    fn test_paging_exact_multiple_of_page_size() {
        assert_eq!(next_start_index(1, Some(2000), 1000, 1000, 1000), Some(1001));
        assert_eq!(next_start_index(1001, Some(2000), 2000, 1000, 1000), None);
    }

    #[test]
    fn test_paging_stops_on_empty_page() {
        // Provider overstates the total
        assert_eq!(next_start_index(1001, Some(5000), 1000, 0, 1000), None);
        assert_eq!(next_start_index(1, None, 0, 0, 1000), None);
    }

    #[test]
    fn test_paging_without_total_results() {
        assert_eq!(next_start_index(1, None, 1000, 1000, 1000), Some(1001));
        assert_eq!(next_start_index(1001, None, 1999, 999, 1000), None);
    }

    #[test]
    fn test_paging_follows_short_pages_with_total() {
        // Provider caps the page below the requested count
        assert_eq!(next_start_index(1, Some(1200), 500, 500, 1000), Some(501));
    }
}
