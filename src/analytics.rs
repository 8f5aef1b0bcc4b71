//! Client-side Analytics
//!
//! Pure reductions over business-analytics day records and overall
//! analytics: per-date breakdowns, month calendar, trend and chart series.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::api::{BusinessAnalyticsRecord, DailyMetrics, Gender};

/// Fixed visitor age ranges, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AgeGroup {
    Babies,
    Children,
    YoungAdults,
    MiddleAged,
    OldAdults,
    Unknown,
}

impl AgeGroup {
    /// All groups in display order
    pub const ALL: [AgeGroup; 6] = [
        AgeGroup::Babies,
        AgeGroup::Children,
        AgeGroup::YoungAdults,
        AgeGroup::MiddleAged,
        AgeGroup::OldAdults,
        AgeGroup::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Babies => "Babies (0-2)",
            AgeGroup::Children => "Children (3-16)",
            AgeGroup::YoungAdults => "Young Adults (17-30)",
            AgeGroup::MiddleAged => "Middle-aged Adults (31-45)",
            AgeGroup::OldAdults => "Old Adults (Above 45)",
            AgeGroup::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket an age.
///
/// Missing, negative and non-finite ages are `Unknown`, as is anything
/// falling between the ranges (e.g. 2.5).
pub fn age_group(age: Option<f64>) -> AgeGroup {
    let Some(age) = age.filter(|a| a.is_finite() && *a >= 0.0) else {
        return AgeGroup::Unknown;
    };

    if age <= 2.0 {
        AgeGroup::Babies
    } else if (3.0..=16.0).contains(&age) {
        AgeGroup::Children
    } else if (17.0..=30.0).contains(&age) {
        AgeGroup::YoungAdults
    } else if (31.0..=45.0).contains(&age) {
        AgeGroup::MiddleAged
    } else if age > 45.0 {
        AgeGroup::OldAdults
    } else {
        AgeGroup::Unknown
    }
}

/// Record counts by gender
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenderDistribution {
    pub female: usize,
    pub male: usize,
    pub unknown: usize,
}

impl GenderDistribution {
    fn add(&mut self, gender: Gender) {
        match gender {
            Gender::Female => self.female += 1,
            Gender::Male => self.male += 1,
            Gender::Unknown => self.unknown += 1,
        }
    }
}

/// Breakdown of one day's business-analytics records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateAnalytics {
    pub date: String,
    /// Distinct person ids
    pub unique_customers: usize,
    /// Sum of daily visit counts
    pub total_visits: u64,
    pub repeat_customers: usize,
    /// Records with more than one visit that day
    pub frequent_visitors: usize,
    pub gender_distribution: GenderDistribution,
    /// Count per group, every group present
    pub age_groups: BTreeMap<AgeGroup, usize>,
    pub customer_details: Vec<BusinessAnalyticsRecord>,
}

/// Sorted distinct dates that have records
pub fn available_dates(records: &[BusinessAnalyticsRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.date.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Analytics for a single date, `None` when the date has no records
pub fn date_analytics(records: &[BusinessAnalyticsRecord], date: &str) -> Option<DateAnalytics> {
    let day: Vec<&BusinessAnalyticsRecord> =
        records.iter().filter(|record| record.date == date).collect();
    if day.is_empty() {
        return None;
    }

    let unique_customers = day
        .iter()
        .map(|record| record.person_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut gender_distribution = GenderDistribution::default();
    let mut age_groups: BTreeMap<AgeGroup, usize> =
        AgeGroup::ALL.iter().map(|group| (*group, 0)).collect();

    for record in &day {
        gender_distribution.add(record.gender);
        *age_groups.entry(age_group(record.age)).or_insert(0) += 1;
    }

    Some(DateAnalytics {
        date: date.to_string(),
        unique_customers,
        total_visits: day.iter().map(|record| record.daily_visit_count).sum(),
        repeat_customers: day.iter().filter(|record| record.is_repeat_customer).count(),
        frequent_visitors: day.iter().filter(|record| record.daily_visit_count > 1).count(),
        gender_distribution,
        age_groups,
        customer_details: day.into_iter().cloned().collect(),
    })
}

/// Customers and visits for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub unique_customers: usize,
    pub total_visits: u64,
    pub days_with_data: usize,
}

/// Per-month totals in month order
pub fn monthly_summary(records: &[BusinessAnalyticsRecord]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<&str, Vec<&BusinessAnalyticsRecord>> = BTreeMap::new();
    for record in records {
        let month = record.date.get(..7).unwrap_or(&record.date);
        months.entry(month).or_default().push(record);
    }

    months
        .into_iter()
        .map(|(month, records)| MonthlySummary {
            month: month.to_string(),
            unique_customers: records
                .iter()
                .map(|r| r.person_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
            total_visits: records.iter().map(|r| r.daily_visit_count).sum(),
            days_with_data: records
                .iter()
                .map(|r| r.date.as_str())
                .collect::<HashSet<_>>()
                .len(),
        })
        .collect()
}

/// One point of the daily visit trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub unique_customers: usize,
    pub total_visits: u64,
}

/// Unique customers and visits per date, in date order
pub fn daily_trend(records: &[BusinessAnalyticsRecord]) -> Vec<TrendPoint> {
    available_dates(records)
        .into_iter()
        .filter_map(|date| date_analytics(records, &date))
        .map(|day| TrendPoint {
            date: day.date,
            unique_customers: day.unique_customers,
            total_visits: day.total_visits,
        })
        .collect()
}

/// One day cell in the month calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    pub has_data: bool,
}

/// Sunday-first month grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Leading `None`s pad the first week
    pub cells: Vec<Option<CalendarDay>>,
}

impl CalendarMonth {
    pub const WEEKDAYS: [&'static str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    /// Cells grouped into weeks of seven
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<CalendarDay>]> {
        self.cells.chunks(7)
    }
}

/// Build the calendar for `year`/`month`, flagging dates in `available`.
///
/// Returns `None` for an invalid month.
pub fn calendar_month(year: i32, month: u32, available: &[String]) -> Option<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let days_in_month = (next_month - first).num_days() as u32;
    let available: HashSet<&str> = available.iter().map(String::as_str).collect();

    let mut cells: Vec<Option<CalendarDay>> =
        vec![None; first.weekday().num_days_from_sunday() as usize];

    for day in 1..=days_in_month {
        let date = format!("{:04}-{:02}-{:02}", year, month, day);
        cells.push(Some(CalendarDay {
            day,
            has_data: available.contains(date.as_str()),
            date,
        }));
    }

    Some(CalendarMonth { year, month, cells })
}

/// One slice of the rejection-reason chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: u64,
    /// Share of all rejections, rounded
    pub percent: u64,
}

/// Rejection reasons as chart slices; only the first `_` becomes a space
pub fn rejection_chart(reasons: &BTreeMap<String, u64>) -> Vec<ChartSlice> {
    let total: u64 = reasons.values().sum();

    reasons
        .iter()
        .map(|(reason, count)| ChartSlice {
            name: reason.replacen('_', " ", 1),
            value: *count,
            percent: crate::api::percent(*count, total),
        })
        .collect()
}

/// One day of the legacy daily metrics chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyMetricsPoint {
    /// "Day N", 1-based
    pub day: String,
    pub faces: u64,
    pub sessions: u64,
    pub quality: u64,
}

/// Zip the legacy daily series, indexed by face counts
pub fn daily_metrics_chart(metrics: &DailyMetrics) -> Vec<DailyMetricsPoint> {
    metrics
        .daily_face_counts
        .iter()
        .enumerate()
        .map(|(i, faces)| DailyMetricsPoint {
            day: format!("Day {}", i + 1),
            faces: *faces,
            sessions: metrics.daily_session_counts.get(i).copied().unwrap_or(0),
            quality: metrics.daily_quality_pass_counts.get(i).copied().unwrap_or(0),
        })
        .collect()
}

/// Rounded faces per session, 0 without sessions
pub fn avg_faces_per_session(total_faces: u64, total_sessions: u64) -> u64 {
    if total_faces == 0 || total_sessions == 0 {
        return 0;
    }
    (total_faces as f64 / total_sessions as f64).round() as u64
}

/// Overall success rate: quality% × detection% / 100, rounded
pub fn overall_efficiency(quality_pass_rate: f64, detection_rate: f64) -> u64 {
    if quality_pass_rate <= 0.0 || detection_rate <= 0.0 {
        return 0;
    }
    (quality_pass_rate * detection_rate / 100.0).round() as u64
}
