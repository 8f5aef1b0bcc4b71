//! Exact-Match Search
//!
//! Search resolves a query by looking it up directly as a session name
//! and/or a person id. No partial or fuzzy matching is attempted; a failed
//! lookup simply contributes no result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::client::ApiClient;
use super::dto::{Person, Session};

/// Which entity kinds a search covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Sessions,
    People,
}

impl SearchType {
    pub fn includes_sessions(&self) -> bool {
        matches!(self, SearchType::All | SearchType::Sessions)
    }

    pub fn includes_people(&self) -> bool {
        matches!(self, SearchType::All | SearchType::People)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::All => "all",
            SearchType::Sessions => "sessions",
            SearchType::People => "people",
        }
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SearchType::All),
            "sessions" | "session" => Ok(SearchType::Sessions),
            "people" | "persons" | "person" => Ok(SearchType::People),
            other => Err(format!("unknown search type: {}", other)),
        }
    }
}

/// Kind of entity a result points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Session,
    Person,
}

/// A single search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub id: String,
    pub name: String,
    pub timestamp: Option<String>,
    pub face_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count: Option<u64>,
    /// Exact matches always score 1.0
    pub score: f64,
    pub metadata: BTreeMap<String, String>,
}

impl SearchResult {
    fn from_session(session: &Session) -> Self {
        let metrics = &session.combined_metrics;
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "total_frames".to_string(),
            metrics.total_frames_processed.to_string(),
        );
        metadata.insert(
            "processing_time".to_string(),
            session.session_info.processing_time.to_string(),
        );

        Self {
            kind: ResultKind::Session,
            id: session.session_name.clone(),
            name: session.session_name.clone(),
            timestamp: session.session_info.timestamp.clone(),
            face_count: session.faces_detected(),
            quality_score: Some(percent(metrics.quality_passed, session.faces_detected())),
            session_count: None,
            score: 1.0,
            metadata,
        }
    }

    fn from_person(person: &Person) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "first_seen".to_string(),
            person.first_seen.clone().unwrap_or_else(|| "Unknown".to_string()),
        );
        metadata.insert(
            "age".to_string(),
            match person.age {
                Some(age) if age > 0.0 => age.to_string(),
                _ => "Unknown".to_string(),
            },
        );
        metadata.insert("gender".to_string(), person.gender.label().to_string());

        Self {
            kind: ResultKind::Person,
            id: person.person_id.clone(),
            name: person.person_id.clone(),
            timestamp: person.last_seen.clone(),
            face_count: person.face_total(),
            quality_score: None,
            session_count: Some(person.session_total()),
            score: 1.0,
            metadata,
        }
    }
}

/// Outcome of a search call
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Rounded percentage of `part` over `whole`, 0 when either is 0
pub fn percent(part: u64, whole: u64) -> u64 {
    if part == 0 || whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u64
    }
}

/// Search by exact session name and/or person id.
///
/// A blank query makes no request. Otherwise the term is looked up as
/// given, surrounding whitespace included. Lookup failures (404, transport errors) are logged and swallowed; the
/// response is always successful.
pub async fn search_data(api: &ApiClient, query: &str, search_type: SearchType) -> SearchResponse {
    let mut results = Vec::new();

    if query.trim().is_empty() {
        return SearchResponse {
            results,
            success: true,
            error: None,
        };
    }

    tracing::debug!(query = %query, search_type = search_type.as_str(), "Searching");

    if search_type.includes_sessions() {
        match api.get_session_details(query).await {
            Ok(response) => {
                if let Some(session) = response.session {
                    tracing::debug!(session = %session.session_name, "Exact session match");
                    results.push(SearchResult::from_session(&session));
                }
            }
            Err(e) => {
                tracing::debug!(query = %query, error = %e, "No exact session match");
            }
        }
    }

    if search_type.includes_people() {
        match api.get_person_details(query).await {
            Ok(response) => {
                if let Some(person) = response.person {
                    tracing::debug!(person = %person.person_id, "Exact person match");
                    results.push(SearchResult::from_person(&person));
                }
            }
            Err(e) => {
                tracing::debug!(query = %query, error = %e, "No exact person match");
            }
        }
    }

    tracing::info!(query = %query, results = results.len(), "Search complete");

    SearchResponse {
        results,
        success: true,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_type_parsing() {
        assert_eq!("all".parse::<SearchType>().unwrap(), SearchType::All);
        assert_eq!("Sessions".parse::<SearchType>().unwrap(), SearchType::Sessions);
        assert_eq!("people".parse::<SearchType>().unwrap(), SearchType::People);
        assert!("faces".parse::<SearchType>().is_err());

        assert!(SearchType::All.includes_sessions() && SearchType::All.includes_people());
        assert!(!SearchType::Sessions.includes_people());
        assert!(!SearchType::People.includes_sessions());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 10), 0);
        assert_eq!(percent(5, 0), 0);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(10, 10), 100);
    }

    #[test]
    fn test_session_result() {
        let session: Session = serde_json::from_value(json!({
            "session_name": "cam-7",
            "session_info": { "timestamp": "2024-05-01T09:00:00", "processing_time": 12.5 },
            "combined_metrics": {
                "faces_detected": 40,
                "quality_passed": 30,
                "total_frames_processed": 900
            }
        }))
        .unwrap();

        let result = SearchResult::from_session(&session);
        assert_eq!(result.kind, ResultKind::Session);
        assert_eq!(result.id, "cam-7");
        assert_eq!(result.face_count, 40);
        assert_eq!(result.quality_score, Some(75));
        assert_eq!(result.score, 1.0);
        assert_eq!(result.metadata["total_frames"], "900");
        assert_eq!(result.metadata["processing_time"], "12.5");
    }

    #[test]
    fn test_person_result() {
        let person: Person = serde_json::from_value(json!({
            "person_id": "person_42",
            "total_faces": 8,
            "sessions": ["a", "b", "c"],
            "first_seen": "2024-01-01T00:00:00",
            "last_seen": "2024-02-01T00:00:00",
            "gender": 0
        }))
        .unwrap();

        let result = SearchResult::from_person(&person);
        assert_eq!(result.kind, ResultKind::Person);
        assert_eq!(result.session_count, Some(3));
        assert_eq!(result.face_count, 8);
        assert_eq!(result.timestamp.as_deref(), Some("2024-02-01T00:00:00"));
        assert_eq!(result.metadata["age"], "Unknown");
        assert_eq!(result.metadata["gender"], "Female");
    }

    #[tokio::test]
    async fn test_blank_query_makes_no_request() {
        let api = ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "closed");
        let response = search_data(&api, "   ", SearchType::All).await;
        assert!(response.success);
        assert!(response.results.is_empty());
    }
}
