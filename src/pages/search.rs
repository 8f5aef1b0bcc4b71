//! Search

use async_trait::async_trait;
use serde::Serialize;

use super::Page;
use crate::api::{search_data, ApiClient, ApiResult, SearchResponse, SearchType};

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub search_type: SearchType,
    pub response: SearchResponse,
}

#[async_trait]
impl Page for SearchPage {
    const NAME: &'static str = "search";
    type Params = (String, SearchType);

    async fn fetch(api: &ApiClient, params: &(String, SearchType)) -> ApiResult<Self> {
        let (query, search_type) = params;
        Ok(Self {
            query: query.clone(),
            search_type: *search_type,
            response: search_data(api, query, *search_type).await,
        })
    }

    fn fallback((query, search_type): &(String, SearchType)) -> Self {
        Self {
            query: query.clone(),
            search_type: *search_type,
            response: SearchResponse {
                results: Vec::new(),
                success: false,
                error: None,
            },
        }
    }
}
