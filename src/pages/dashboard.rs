//! Dashboard
//!
//! Metric cards and the quality panel from overall analytics, plus the
//! live sessions and recent
//! visitors widgets. The widgets load independently of the cards, so one
//! failing leaves the others intact.

use async_trait::async_trait;
use serde::Serialize;

use super::Page;
use crate::analytics::{self, ChartSlice};
use crate::api::{ApiClient, ApiResult, OverallAnalytics, Person, Session};
use crate::store::ConnectionStatus;

/// Default size of the dashboard widgets
pub const RECENT_LIMIT: usize = 5;

/// One headline number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
}

/// Headline cards and connection indicators
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub cards: Vec<MetricCard>,
    pub detection_rate: f64,
    pub quality_pass_rate: f64,
    pub rejection_reasons: Vec<ChartSlice>,
    pub connection: ConnectionStatus,
}

impl Dashboard {
    pub fn from_analytics(overall: &OverallAnalytics, connection: ConnectionStatus) -> Self {
        Self {
            cards: vec![
                MetricCard {
                    title: "Total Faces",
                    value: overall.total_faces.to_string(),
                },
                MetricCard {
                    title: "Active Sessions",
                    value: overall.total_sessions.to_string(),
                },
                MetricCard {
                    title: "Unique Visitors",
                    value: overall.unique_person_ids.to_string(),
                },
                MetricCard {
                    title: "Quality Score",
                    value: format!("{}%", format_rate(overall.quality_pass_rate)),
                },
            ],
            detection_rate: overall.detection_rate,
            quality_pass_rate: overall.quality_pass_rate,
            rejection_reasons: analytics::rejection_chart(&overall.rejection_reasons),
            connection,
        }
    }
}

#[async_trait]
impl Page for Dashboard {
    const NAME: &'static str = "dashboard";
    type Params = ConnectionStatus;

    async fn fetch(api: &ApiClient, connection: &ConnectionStatus) -> ApiResult<Self> {
        let overall = api.get_overall_analytics().await?;
        Ok(Self::from_analytics(&overall, connection.clone()))
    }

    fn fallback(connection: &ConnectionStatus) -> Self {
        Self::from_analytics(&OverallAnalytics::default(), connection.clone())
    }
}

/// Latest sessions widget
#[derive(Debug, Clone, Default, Serialize)]
pub struct LiveSessions {
    pub sessions: Vec<Session>,
}

#[async_trait]
impl Page for LiveSessions {
    const NAME: &'static str = "live_sessions";
    /// Number of sessions to show
    type Params = usize;

    async fn fetch(api: &ApiClient, limit: &usize) -> ApiResult<Self> {
        let response = api.get_sessions(*limit, 0).await?;
        Ok(Self {
            sessions: response.sessions,
        })
    }

    fn fallback(_limit: &usize) -> Self {
        Self::default()
    }
}

/// Latest visitors widget
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecentVisitors {
    pub visitors: Vec<Person>,
}

#[async_trait]
impl Page for RecentVisitors {
    const NAME: &'static str = "recent_visitors";
    type Params = usize;

    async fn fetch(api: &ApiClient, limit: &usize) -> ApiResult<Self> {
        let response = api.get_people(*limit, 0).await?;
        Ok(Self {
            visitors: response.persons,
        })
    }

    fn fallback(_limit: &usize) -> Self {
        Self::default()
    }
}

/// Integral rates print without a fraction
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{}", rate as i64)
    } else {
        format!("{:.1}", rate)
    }
}
