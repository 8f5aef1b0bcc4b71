//! Session Details
//!
//! One session with its derived detection and quality figures.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeSet;

use super::Page;
use crate::api::{percent, ApiClient, ApiResult, Session};

/// Figures derived from a session's raw metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub faces_detected: u64,
    pub quality_passed: u64,
    pub total_frames: u64,
    pub features_extracted: u64,
    /// faces / frames, as a rounded percentage
    pub detection_rate: u64,
    /// passed / faces, as a rounded percentage
    pub quality_rate: u64,
    pub face_features: usize,
    /// Mean metadata confidence × 100, `None` without metadata
    pub avg_confidence: Option<u64>,
    /// Mean metadata blur score × 100, `None` without metadata
    pub avg_blur: Option<u64>,
    pub distinct_views: usize,
}

impl SessionStats {
    pub fn from_session(session: &Session) -> Self {
        let metrics = &session.combined_metrics;
        let faces = session.faces_detected();

        let mean_percent = |value: fn(&crate::api::FaceMetadata) -> f64| {
            if session.metadata.is_empty() {
                return None;
            }
            let sum: f64 = session.metadata.iter().map(value).sum();
            Some((sum / session.metadata.len() as f64 * 100.0).round().max(0.0) as u64)
        };

        Self {
            faces_detected: faces,
            quality_passed: metrics.quality_passed,
            total_frames: metrics.total_frames_processed,
            features_extracted: metrics.features_extracted,
            detection_rate: percent(faces, metrics.total_frames_processed),
            quality_rate: percent(metrics.quality_passed, faces),
            face_features: session.face_features.len(),
            avg_confidence: mean_percent(|m| m.confidence),
            avg_blur: mean_percent(|m| m.blur_score),
            distinct_views: session
                .metadata
                .iter()
                .filter_map(|m| m.view.as_deref())
                .collect::<BTreeSet<_>>()
                .len(),
        }
    }
}

/// Session details page; `session` is `None` when the backend has no such session
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetails {
    pub name: String,
    pub session: Option<Session>,
    pub stats: Option<SessionStats>,
}

impl SessionDetails {
    pub fn not_found(name: &str) -> Self {
        Self {
            name: name.to_string(),
            session: None,
            stats: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.session.is_some()
    }

    /// Session info as display pairs, timestamp and processing time first
    pub fn info_entries(&self) -> Vec<(String, String)> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let info = &session.session_info;

        let mut entries = vec![
            (
                "timestamp".to_string(),
                info.timestamp.clone().unwrap_or_else(|| crate::time::UNKNOWN.to_string()),
            ),
            ("processing_time".to_string(), format!("{:.2}s", info.processing_time)),
        ];
        if !info.s3_cdn_urls.is_empty() {
            entries.push(("s3_cdn_urls".to_string(), info.s3_cdn_urls.join(", ")));
        }
        for (key, value) in &info.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            entries.push((key.clone(), value));
        }
        entries
    }
}

#[async_trait]
impl Page for SessionDetails {
    const NAME: &'static str = "session_details";
    /// Session name
    type Params = String;

    async fn fetch(api: &ApiClient, name: &String) -> ApiResult<Self> {
        let response = api.get_session_details(name).await?;
        Ok(match response.session {
            Some(session) => Self {
                name: name.clone(),
                stats: Some(SessionStats::from_session(&session)),
                session: Some(session),
            },
            None => Self::not_found(name),
        })
    }

    fn fallback(name: &String) -> Self {
        Self::not_found(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats() {
        let session: Session = serde_json::from_value(json!({
            "session_name": "front_2024-03-01",
            "combined_metrics": {
                "faces_detected": 40,
                "quality_passed": 30,
                "total_frames_processed": 200,
                "features_extracted": 28
            },
            "face_features": [{}, {}],
            "metadata": [
                { "confidence": 0.9, "blur_score": 0.1, "view": "left" },
                { "confidence": 0.8, "blur_score": 0.3, "view": "left" },
                { "confidence": 0.7, "view": "right" }
            ]
        }))
        .unwrap();

        let stats = SessionStats::from_session(&session);
        assert_eq!(stats.detection_rate, 20);
        assert_eq!(stats.quality_rate, 75);
        assert_eq!(stats.face_features, 2);
        assert_eq!(stats.avg_confidence, Some(80));
        assert_eq!(stats.avg_blur, Some(13));
        assert_eq!(stats.distinct_views, 2);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let stats = SessionStats::from_session(&Session::default());
        assert_eq!(stats.detection_rate, 0);
        assert_eq!(stats.quality_rate, 0);
        assert_eq!(stats.avg_confidence, None);
    }

    #[test]
    fn test_not_found() {
        let details = SessionDetails::fallback(&"missing".to_string());
        assert!(!details.is_found());
        assert!(details.info_entries().is_empty());
    }
}
