//! Analytics
//!
//! Joins overall analytics with the business-analytics day records and
//! derives every chart and breakdown the page shows. The legacy daily
//! metrics load alongside but outside the join; a backend without them
//! just shows no daily chart.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::Page;
use crate::analytics::{
    self, CalendarMonth, ChartSlice, DailyMetricsPoint, DateAnalytics, MonthlySummary,
    TrendPoint,
};
use crate::api::{ApiClient, ApiResult, BusinessAnalytics, OverallAnalytics};

/// What the analytics page shows beyond the store-wide totals
#[derive(Debug, Clone)]
pub struct AnalyticsParams {
    /// Date whose breakdown is expanded
    pub selected_date: Option<NaiveDate>,
    /// Calendar month to draw
    pub month: NaiveDate,
}

impl AnalyticsParams {
    /// Calendar on the month of `today`, nothing selected
    pub fn for_month_of(today: NaiveDate) -> Self {
        Self {
            selected_date: None,
            month: today,
        }
    }

    pub fn select(mut self, date: NaiveDate) -> Self {
        self.selected_date = Some(date);
        self
    }
}

/// Key metrics and quality details
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_faces: u64,
    pub total_sessions: u64,
    pub unique_visitors: u64,
    pub quality_pass_rate: f64,
    pub detection_rate: f64,
    pub avg_faces_per_session: u64,
    /// quality% × detection% / 100
    pub overall_efficiency: u64,
}

impl From<&OverallAnalytics> for KeyMetrics {
    fn from(overall: &OverallAnalytics) -> Self {
        Self {
            total_faces: overall.total_faces,
            total_sessions: overall.total_sessions,
            unique_visitors: overall.unique_person_ids,
            quality_pass_rate: overall.quality_pass_rate,
            detection_rate: overall.detection_rate,
            avg_faces_per_session: analytics::avg_faces_per_session(
                overall.total_faces,
                overall.total_sessions,
            ),
            overall_efficiency: analytics::overall_efficiency(
                overall.quality_pass_rate,
                overall.detection_rate,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsPage {
    pub metrics: KeyMetrics,
    pub rejection_chart: Vec<ChartSlice>,
    pub trend: Vec<TrendPoint>,
    pub months: Vec<MonthlySummary>,
    pub available_dates: Vec<String>,
    pub calendar: Option<CalendarMonth>,
    /// Breakdown for the selected date, `None` if it has no records
    pub selected: Option<DateAnalytics>,
    /// Legacy per-day faces, sessions and quality passes
    pub daily_metrics: Vec<DailyMetricsPoint>,
}

impl AnalyticsPage {
    pub fn build(
        overall: &OverallAnalytics,
        business: &BusinessAnalytics,
        params: &AnalyticsParams,
    ) -> Self {
        let records = &business.daily_records;
        let available_dates = analytics::available_dates(records);

        let selected = params.selected_date.and_then(|date| {
            analytics::date_analytics(records, &date.format("%Y-%m-%d").to_string())
        });

        Self {
            metrics: KeyMetrics::from(overall),
            rejection_chart: analytics::rejection_chart(&overall.rejection_reasons),
            trend: analytics::daily_trend(records),
            months: analytics::monthly_summary(records),
            calendar: analytics::calendar_month(
                params.month.year(),
                params.month.month(),
                &available_dates,
            ),
            available_dates,
            selected,
            daily_metrics: Vec::new(),
        }
    }
}

#[async_trait]
impl Page for AnalyticsPage {
    const NAME: &'static str = "analytics";
    type Params = AnalyticsParams;

    async fn fetch(api: &ApiClient, params: &AnalyticsParams) -> ApiResult<Self> {
        let core = async {
            tokio::try_join!(
                api.get_overall_analytics(),
                api.get_business_analytics(None),
            )
        };
        let (core, daily) = tokio::join!(core, api.get_daily_metrics());
        let (overall, business) = core?;

        tracing::debug!(
            records = business.daily_records.len(),
            "Business analytics loaded"
        );

        let mut page = Self::build(&overall, &business, params);
        match daily {
            Ok(metrics) => page.daily_metrics = analytics::daily_metrics_chart(&metrics),
            Err(e) => tracing::debug!(error = %e, "Daily metrics unavailable"),
        }
        Ok(page)
    }

    fn fallback(params: &AnalyticsParams) -> Self {
        Self::build(
            &OverallAnalytics::default(),
            &BusinessAnalytics::default(),
            params,
        )
    }
}
