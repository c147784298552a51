use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::domain::{
    Expense, Group, GroupBalance, GroupId, NewExpense, NewGroup, NewUser, User, UserBalance,
    UserId,
};

use super::error::{ApiError, extract_detail};

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Typed client for the backend's REST API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Url::parse(&config.base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================
    // Users
    // ========================

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post("/users", user).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users").await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.get(&format!("/users/{}", id)).await
    }

    // ========================
    // Groups
    // ========================

    pub async fn create_group(&self, group: &NewGroup) -> Result<Group, ApiError> {
        self.post("/groups", group).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        self.get("/groups").await
    }

    pub async fn get_group(&self, id: GroupId) -> Result<Group, ApiError> {
        self.get(&format!("/groups/{}", id)).await
    }

    // ========================
    // Expenses
    // ========================

    pub async fn create_expense(
        &self,
        group_id: GroupId,
        expense: &NewExpense,
    ) -> Result<Expense, ApiError> {
        self.post(&format!("/expenses/groups/{}/expenses", group_id), expense)
            .await
    }

    pub async fn list_group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>, ApiError> {
        self.get(&format!("/expenses/groups/{}/expenses", group_id))
            .await
    }

    // ========================
    // Balances
    // ========================

    pub async fn get_group_balances(&self, group_id: GroupId) -> Result<GroupBalance, ApiError> {
        self.get(&format!("/balances/groups/{}", group_id)).await
    }

    pub async fn get_user_balances(&self, user_id: UserId) -> Result<UserBalance, ApiError> {
        self.get(&format!("/balances/users/{}", user_id)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path);
        self.send(Method::GET, path, request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(%method, path, "sending request");

        let response = request.send().await.map_err(|source| {
            warn!(%method, path, error = %source, "request failed");
            ApiError::Transport {
                path: path.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        if !status.is_success() {
            let detail = extract_detail(status, &body);
            warn!(%method, path, %status, %detail, "request rejected");
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
                detail,
            });
        }

        debug!(%method, path, %status, bytes = body.len(), "response received");
        serde_json::from_str(&body).map_err(|source| {
            warn!(%method, path, error = %source, "response did not match schema");
            ApiError::Decode {
                path: path.to_string(),
                source,
            }
        })
    }
}
