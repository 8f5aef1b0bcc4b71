//! Data Transfer Objects
//!
//! Typed response schemas for the store backend. Missing fields and
//! explicit `null`s both land on defaults here, so callers never need to
//! re-check optional paths.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

// ============================================
// LENIENT FIELD DECODERS
// ============================================

/// Treat `null` like an absent field
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-negative counter; accepts integers, floats, numeric strings or null
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(to_count(number(deserializer)?))
}

/// Optional counter, `None` when absent or null
fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?
        .filter(|n| n.is_finite())
        .map(|n| n.max(0.0) as u64))
}

/// Float that defaults to 0 when absent or null
fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.unwrap_or(0.0))
}

/// Map of counters, each value decoded like [`count`]
fn count_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, to_count(as_number(value))))
        .collect())
}

fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(as_number))
}

fn as_number(value: serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_count(n: Option<f64>) -> u64 {
    n.filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as u64)
        .unwrap_or(0)
}

// ============================================
// HEALTH
// ============================================

/// `GET /health`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub database_status: Option<String>,
    #[serde(default)]
    pub processing_status: Option<String>,
}

// ============================================
// SESSIONS
// ============================================

/// `GET /sessions?limit&offset`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionsResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block returned by newer backends
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "null_default")]
    pub has_more: bool,
    #[serde(default, deserialize_with = "optional_count")]
    pub total: Option<u64>,
}

/// `GET /sessions/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDetailsResponse {
    #[serde(default)]
    pub session: Option<Session>,
}

/// One recorded face-detection processing run
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Session {
    #[serde(default, deserialize_with = "null_default")]
    pub session_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub session_info: SessionInfo,
    #[serde(default, deserialize_with = "null_default")]
    pub combined_metrics: CombinedMetrics,
    #[serde(default, deserialize_with = "null_default")]
    pub view_statistics: BTreeMap<String, ViewStatistics>,
    #[serde(default, deserialize_with = "null_default")]
    pub face_features: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "null_default")]
    pub metadata: Vec<FaceMetadata>,
    /// Deprecated: older backends reported detections at the top level
    #[serde(default, deserialize_with = "optional_count", skip_serializing)]
    pub face_count: Option<u64>,
}

impl Session {
    /// Faces detected, falling back to the deprecated `face_count`
    pub fn faces_detected(&self) -> u64 {
        if self.combined_metrics.faces_detected > 0 {
            self.combined_metrics.faces_detected
        } else {
            self.face_count.unwrap_or(0)
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.session_info.timestamp.as_deref()
    }
}

/// Session-level processing information
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "float")]
    pub processing_time: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub s3_cdn_urls: Vec<String>,
    /// Any further fields the backend attaches
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Detection and quality counters
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CombinedMetrics {
    #[serde(default, deserialize_with = "count")]
    pub faces_detected: u64,
    #[serde(default, deserialize_with = "count")]
    pub quality_passed: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_frames_processed: u64,
    #[serde(default, deserialize_with = "count")]
    pub features_extracted: u64,
}

/// Per-camera-view statistics within a session
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ViewStatistics {
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default, deserialize_with = "float")]
    pub processing_time: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub metrics: CombinedMetrics,
    #[serde(default, deserialize_with = "null_default")]
    pub filter_statistics: BTreeMap<String, serde_json::Value>,
}

/// Per-face metadata entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FaceMetadata {
    #[serde(default, deserialize_with = "float")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "float")]
    pub blur_score: f64,
    #[serde(default)]
    pub view: Option<String>,
}

// ============================================
// PERSONS
// ============================================

/// `GET /persons?limit&offset`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersonsResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `GET /persons/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct PersonDetailsResponse {
    #[serde(default)]
    pub person: Option<Person>,
}

/// A deduplicated identity aggregated across sessions
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Person {
    #[serde(default, deserialize_with = "null_default")]
    pub person_id: String,
    #[serde(default, deserialize_with = "count")]
    pub total_visits: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_faces: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default, deserialize_with = "number")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "float")]
    pub average_age: f64,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, deserialize_with = "null_default")]
    pub faces: Vec<serde_json::Value>,
    /// Deprecated: superseded by `total_faces`
    #[serde(default, deserialize_with = "optional_count", skip_serializing)]
    pub face_count: Option<u64>,
    /// Deprecated: superseded by `sessions.len()`
    #[serde(default, deserialize_with = "optional_count", skip_serializing)]
    pub session_count: Option<u64>,
}

impl Person {
    /// Faces attributed to the person, falling back to the deprecated `face_count`
    pub fn face_total(&self) -> u64 {
        if self.total_faces > 0 {
            self.total_faces
        } else {
            self.face_count.unwrap_or(0)
        }
    }

    /// Number of sessions the person appeared in
    pub fn session_total(&self) -> u64 {
        if !self.sessions.is_empty() {
            self.sessions.len() as u64
        } else if self.total_visits > 0 {
            self.total_visits
        } else {
            self.session_count.unwrap_or(0)
        }
    }
}

/// Gender code as reported by the backend: 0 female, 1 male, anything else unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unknown,
}

impl Gender {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => Gender::Female,
            Some(1) => Gender::Male,
            _ => Gender::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = number(deserializer)?
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64);
        Ok(Gender::from_code(code))
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label().to_lowercase())
    }
}

// ============================================
// ANALYTICS
// ============================================

/// `GET /overall_analytics`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverallAnalyticsResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub overall_analytics: OverallAnalytics,
}

/// Store-wide detection and quality totals
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct OverallAnalytics {
    #[serde(default, deserialize_with = "count")]
    pub total_faces: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_sessions: u64,
    #[serde(default, deserialize_with = "count")]
    pub unique_person_ids: u64,
    #[serde(default, deserialize_with = "float")]
    pub quality_pass_rate: f64,
    #[serde(default, deserialize_with = "float")]
    pub detection_rate: f64,
    #[serde(default, deserialize_with = "count_map")]
    pub rejection_reasons: BTreeMap<String, u64>,
}

/// `GET /business_analytics[?date=]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessAnalyticsResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub business_analytics: BusinessAnalytics,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BusinessAnalytics {
    #[serde(default, deserialize_with = "null_default")]
    pub daily_records: Vec<BusinessAnalyticsRecord>,
}

/// Per-person-per-day visit and demographic record
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct BusinessAnalyticsRecord {
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "null_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub person_id: String,
    #[serde(default, deserialize_with = "number")]
    pub age: Option<f64>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, deserialize_with = "count")]
    pub daily_visit_count: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub is_repeat_customer: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub session_names: Vec<String>,
}

// ============================================
// LEGACY ENDPOINTS
// ============================================

/// `GET /system/stats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemStatsResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub system_stats: SystemStats,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SystemStats {
    #[serde(default, deserialize_with = "count")]
    pub total_faces: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_sessions: u64,
    #[serde(default, deserialize_with = "count")]
    pub unique_person_ids: u64,
}

impl From<&OverallAnalytics> for SystemStats {
    fn from(overall: &OverallAnalytics) -> Self {
        Self {
            total_faces: overall.total_faces,
            total_sessions: overall.total_sessions,
            unique_person_ids: overall.unique_person_ids,
        }
    }
}

/// Quality figures, derived from overall analytics
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct QualityMetrics {
    #[serde(default, deserialize_with = "float")]
    pub quality_pass_rate_percent: f64,
    #[serde(default, deserialize_with = "float")]
    pub detection_rate_percent: f64,
    #[serde(default, deserialize_with = "count_map")]
    pub rejection_reasons: BTreeMap<String, u64>,
}

impl From<&OverallAnalytics> for QualityMetrics {
    fn from(overall: &OverallAnalytics) -> Self {
        Self {
            quality_pass_rate_percent: overall.quality_pass_rate,
            detection_rate_percent: overall.detection_rate,
            rejection_reasons: overall.rejection_reasons.clone(),
        }
    }
}

/// `GET /daily/metrics`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyMetricsResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub daily_metrics: DailyMetrics,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct DailyMetrics {
    #[serde(default, deserialize_with = "null_default")]
    pub daily_face_counts: Vec<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub daily_session_counts: Vec<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub daily_quality_pass_counts: Vec<u64>,
}

/// `POST /search` body
#[derive(Debug, Clone, Serialize)]
pub struct RemoteSearchRequest {
    pub query: String,
    #[serde(rename = "type")]
    pub search_type: String,
}

/// `POST /search` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteSearchResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub results: Vec<serde_json::Value>,
}
