//! Store Backend Client
//!
//! HTTP client bound to one store's `api_endpoint`. Every accessor is a thin
//! parameter-binding wrapper over [`ApiClient::call`].

use chrono::NaiveDate;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

use super::dto::*;
use super::error::{ApiError, ApiResult};
use crate::store::Store;

/// Timeout applied to `/health` checks
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Typed client for a single store backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store_name: String,
}

impl ApiClient {
    /// Create a client for an explicit base URL
    pub fn new(http: Client, base_url: &str, store_name: &str) -> Self {
        Self {
            http,
            // Normalize: remove trailing slash
            base_url: base_url.trim_end_matches('/').to_string(),
            store_name: store_name.to_string(),
        }
    }

    /// Create a client for a configured store
    pub fn for_store(http: Client, store: &Store) -> Self {
        Self::new(http, &store.api_endpoint, &store.name)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Issue a request against `{base_url}{path}` and decode the JSON body.
    ///
    /// Non-2xx responses fail with [`ApiError::Http`] carrying the status.
    pub async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, None).await
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        timeout: Option<Duration>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let request_id = uuid::Uuid::new_v4();
        let start = Instant::now();

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            store = %self.store_name,
            "API request"
        );

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    url = %url,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "API request failed"
                );
                return Err(ApiError::from_reqwest(e, &url));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                request_id = %request_id,
                status = status.as_u16(),
                url = %url,
                duration_ms = start.elapsed().as_millis() as u64,
                "API error response"
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &url))?;
        let data: T = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            request_id = %request_id,
            status = status.as_u16(),
            url = %url,
            duration_ms = start.elapsed().as_millis() as u64,
            bytes = bytes.len(),
            "API response"
        );

        Ok(data)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.call::<T, ()>(Method::GET, path, None).await
    }

    /// `GET /health`, bounded by [`HEALTH_TIMEOUT`]
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        self.send::<_, ()>(Method::GET, "/health", None, Some(HEALTH_TIMEOUT))
            .await
    }

    /// `GET /overall_analytics`
    pub async fn get_overall_analytics(&self) -> ApiResult<OverallAnalytics> {
        let response: OverallAnalyticsResponse = self.get("/overall_analytics").await?;
        Ok(response.overall_analytics)
    }

    /// `GET /sessions?limit&offset`
    pub async fn get_sessions(&self, limit: usize, offset: usize) -> ApiResult<SessionsResponse> {
        self.get(&format!("/sessions?limit={}&offset={}", limit, offset))
            .await
    }

    /// `GET /sessions/{name}`
    pub async fn get_session_details(&self, session_name: &str) -> ApiResult<SessionDetailsResponse> {
        self.get(&format!("/sessions/{}", urlencoding::encode(session_name)))
            .await
    }

    /// `GET /persons?limit&offset`
    pub async fn get_people(&self, limit: usize, offset: usize) -> ApiResult<PersonsResponse> {
        self.get(&format!("/persons?limit={}&offset={}", limit, offset))
            .await
    }

    /// `GET /persons/{id}`
    pub async fn get_person_details(&self, person_id: &str) -> ApiResult<PersonDetailsResponse> {
        self.get(&format!("/persons/{}", urlencoding::encode(person_id)))
            .await
    }

    /// `GET /business_analytics`, optionally for a single date
    pub async fn get_business_analytics(&self, date: Option<NaiveDate>) -> ApiResult<BusinessAnalytics> {
        let path = match date {
            Some(date) => format!("/business_analytics?date={}", date.format("%Y-%m-%d")),
            None => "/business_analytics".to_string(),
        };
        let response: BusinessAnalyticsResponse = self.get(&path).await?;
        Ok(response.business_analytics)
    }

    /// Legacy `GET /system/stats`
    pub async fn get_system_stats(&self) -> ApiResult<SystemStats> {
        let response: SystemStatsResponse = self.get("/system/stats").await?;
        Ok(response.system_stats)
    }

    /// Quality figures, read from `/overall_analytics`
    pub async fn get_quality_metrics(&self) -> ApiResult<QualityMetrics> {
        let overall = self.get_overall_analytics().await?;
        Ok(QualityMetrics::from(&overall))
    }

    /// Legacy `GET /daily/metrics`
    pub async fn get_daily_metrics(&self) -> ApiResult<DailyMetrics> {
        let response: DailyMetricsResponse = self.get("/daily/metrics").await?;
        Ok(response.daily_metrics)
    }

    /// Legacy `POST /search`
    pub async fn search_remote(&self, query: &str, search_type: &str) -> ApiResult<RemoteSearchResponse> {
        let body = RemoteSearchRequest {
            query: query.to_string(),
            search_type: search_type.to_string(),
        };
        self.call(Method::POST, "/search", Some(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new(Client::new(), "http://store-a:8000/api/", "Store A");
        assert_eq!(client.base_url(), "http://store-a:8000/api");
        assert_eq!(client.store_name(), "Store A");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let client = ApiClient::new(Client::new(), "http://127.0.0.1:9", "closed");
        let err = client.get_sessions(20, 0).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_) | ApiError::Timeout(_)));
        assert_eq!(err.status(), None);
    }
}
