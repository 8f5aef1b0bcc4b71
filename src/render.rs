//! Text Rendering
//!
//! Plain-text views of the page models for the terminal. Every function
//! returns the rendered block so callers decide where it goes.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::analytics::AgeGroup;
use crate::pages::dashboard::format_rate;
use crate::pages::{
    AnalyticsPage, Dashboard, LiveSessions, PeopleList, PersonDetails, RecentVisitors,
    SearchPage, SessionDetails, SessionList,
};
use crate::store::{ConnectionStatus, StoreState};
use crate::time::{self, time_ago, time_ago_or_just_now};

/// Configured stores, marking the selected one
pub fn stores(state: &StoreState) -> String {
    let mut out = String::new();

    if state.stores.is_empty() {
        let _ = writeln!(out, "No stores configured.");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:<12} {:<20} {:<16} {:<9} {}",
        "ID", "Name", "Location", "Status", "Endpoint"
    );
    let _ = writeln!(out, "{}", "-".repeat(80));

    for store in &state.stores {
        let marker = if state.current_id() == Some(store.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let status = if store.is_active() { "active" } else { "inactive" };
        let _ = writeln!(
            out,
            "{} {:<12} {:<20} {:<16} {:<9} {}",
            marker, store.id, store.name, store.location, status, store.api_endpoint
        );
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out);
        let _ = writeln!(out, "Error: {}", error);
    }
    out
}

/// Database / API / processing indicators
pub fn connection(
    status: &ConnectionStatus,
    last_check: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    for (name, component) in [
        ("Database", &status.database),
        ("API", &status.api),
        ("Processing", &status.processing),
    ] {
        let _ = writeln!(out, "  {:<12} {:<13} ({})", name, component.label(), component);
    }
    if let Some(at) = last_check {
        let _ = writeln!(
            out,
            "  Last check:  {}",
            time_ago(Some(&at.to_rfc3339()), now)
        );
    }
    out
}

pub fn dashboard(
    dashboard: &Dashboard,
    live: &LiveSessions,
    recent: &RecentVisitors,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    for card in &dashboard.cards {
        let _ = writeln!(out, "{:<16} {}", card.title, card.value);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Quality");
    let _ = writeln!(out, "  Detection rate:     {}%", format_rate(dashboard.detection_rate));
    let _ = writeln!(out, "  Quality pass rate:  {}%", format_rate(dashboard.quality_pass_rate));
    if dashboard.rejection_reasons.is_empty() {
        let _ = writeln!(out, "  No rejections recorded");
    }
    for slice in &dashboard.rejection_reasons {
        let _ = writeln!(out, "  {:<24} {:>6}", slice.name, slice.value);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Connection:");
    out.push_str(&connection(&dashboard.connection, None, now));

    let _ = writeln!(out);
    let _ = writeln!(out, "Live Sessions");
    if live.sessions.is_empty() {
        let _ = writeln!(out, "  No active sessions");
    }
    for session in &live.sessions {
        let _ = writeln!(
            out,
            "  {:<32} {:>8} {:>6} faces {:>6} passed",
            session.session_name,
            time_ago(session.timestamp(), now),
            session.faces_detected(),
            session.combined_metrics.quality_passed
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recent Visitors");
    if recent.visitors.is_empty() {
        let _ = writeln!(out, "  No recent visitors");
    }
    for person in &recent.visitors {
        let _ = writeln!(
            out,
            "  {:<32} {:>8} {:>4} sessions {:>6} faces",
            person.person_id,
            time_ago(person.last_seen.as_deref(), now),
            person.session_total(),
            person.face_total()
        );
    }
    out
}

pub fn session_list(list: &SessionList, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let visible = list.visible();

    if visible.is_empty() {
        let _ = writeln!(out, "No sessions found");
    } else {
        let _ = writeln!(
            out,
            "{:<36} | {:<10} | {:>7} | {:>7} | {:>7}",
            "Session", "When", "Faces", "Passed", "Frames"
        );
        let _ = writeln!(out, "{}", "-".repeat(80));
        for session in visible {
            let _ = writeln!(
                out,
                "{:<36} | {:<10} | {:>7} | {:>7} | {:>7}",
                session.session_name,
                time_ago_or_just_now(session.timestamp(), now),
                session.faces_detected(),
                session.combined_metrics.quality_passed,
                session.combined_metrics.total_frames_processed
            );
        }
    }

    list_footer(&mut out, list.items().len(), list.has_more(), list.pages_loaded());
    out
}

pub fn people_list(list: &PeopleList, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let visible = list.visible();

    if visible.is_empty() {
        let _ = writeln!(out, "No people found");
    } else {
        let _ = writeln!(
            out,
            "{:<28} | {:<10} | {:>6} | {:>8} | {:>6} | {:<7}",
            "Person", "Last seen", "Visits", "Sessions", "Faces", "Gender"
        );
        let _ = writeln!(out, "{}", "-".repeat(80));
        for person in visible {
            let _ = writeln!(
                out,
                "{:<28} | {:<10} | {:>6} | {:>8} | {:>6} | {:<7}",
                person.person_id,
                time_ago_or_just_now(person.last_seen.as_deref(), now),
                person.total_visits,
                person.session_total(),
                person.face_total(),
                person.gender.label()
            );
        }
    }

    list_footer(&mut out, list.items().len(), list.has_more(), list.pages_loaded());
    out
}

fn list_footer(out: &mut String, loaded: usize, has_more: bool, pages: usize) {
    let _ = writeln!(out);
    if has_more {
        let _ = writeln!(out, "{} loaded; more available (--page {})", loaded, pages);
    } else {
        let _ = writeln!(out, "{} loaded", loaded);
    }
}

pub fn session_details(details: &SessionDetails, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let (Some(session), Some(stats)) = (&details.session, &details.stats) else {
        let _ = writeln!(out, "Session not found: {}", details.name);
        return out;
    };

    let _ = writeln!(out, "{}", session.session_name);
    let _ = writeln!(
        out,
        "{} ({})",
        time::format_timestamp(session.timestamp()),
        time_ago(session.timestamp(), now)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  Faces detected:     {}", stats.faces_detected);
    let _ = writeln!(out, "  Quality passed:     {}", stats.quality_passed);
    let _ = writeln!(out, "  Frames processed:   {}", stats.total_frames);
    let _ = writeln!(out, "  Features extracted: {}", stats.features_extracted);
    let _ = writeln!(out, "  Face features:      {}", stats.face_features);
    let _ = writeln!(out, "  Detection rate:     {}%", stats.detection_rate);
    let _ = writeln!(out, "  Quality rate:       {}%", stats.quality_rate);
    if let Some(confidence) = stats.avg_confidence {
        let _ = writeln!(out, "  Avg confidence:     {}%", confidence);
    }
    if let Some(blur) = stats.avg_blur {
        let _ = writeln!(out, "  Avg blur score:     {}%", blur);
    }
    if stats.distinct_views > 0 {
        let _ = writeln!(out, "  Views:              {}", stats.distinct_views);
    }

    if !session.view_statistics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "View Statistics");
        for (view, view_stats) in &session.view_statistics {
            let _ = writeln!(
                out,
                "  {:<16} {:>6} faces {:>6} passed {:>7} frames {:>8.2}s",
                view,
                view_stats.metrics.faces_detected,
                view_stats.metrics.quality_passed,
                view_stats.metrics.total_frames_processed,
                view_stats.processing_time
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Session Info");
    for (key, value) in details.info_entries() {
        let _ = writeln!(out, "  {:<18} {}", key, value);
    }
    out
}

pub fn person_details(details: &PersonDetails, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let (Some(person), Some(summary)) = (&details.person, &details.summary) else {
        let _ = writeln!(out, "Person not found: {}", details.person_id);
        return out;
    };

    let _ = writeln!(out, "{}", person.person_id);
    let _ = writeln!(
        out,
        "  First seen:    {} ({})",
        time::format_timestamp(person.first_seen.as_deref()),
        time_ago(person.first_seen.as_deref(), now)
    );
    let _ = writeln!(
        out,
        "  Last seen:     {} ({})",
        time::format_timestamp(person.last_seen.as_deref()),
        time_ago(person.last_seen.as_deref(), now)
    );
    let _ = writeln!(out, "  Gender:        {}", summary.gender);
    if person.average_age > 0.0 {
        let _ = writeln!(out, "  Average age:   {:.0}", person.average_age);
    }
    let _ = writeln!(out, "  Visits:        {}", summary.total_visits);
    let _ = writeln!(out, "  Sessions:      {}", summary.session_count);
    let _ = writeln!(out, "  Faces:         {}", summary.total_faces);
    let _ = writeln!(out, "  Days tracked:  {}", summary.days_tracked);

    if !summary.shown_sessions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sessions");
        for name in &summary.shown_sessions {
            let _ = writeln!(out, "  {}", name);
        }
        if let Some(note) = summary.truncation_note() {
            let _ = writeln!(out, "  {}", note);
        }
    }
    out
}

pub fn analytics(page: &AnalyticsPage) -> String {
    let mut out = String::new();
    let m = &page.metrics;

    let _ = writeln!(out, "Key Metrics");
    let _ = writeln!(out, "  Total faces:            {}", m.total_faces);
    let _ = writeln!(out, "  Total sessions:         {}", m.total_sessions);
    let _ = writeln!(out, "  Unique visitors:        {}", m.unique_visitors);
    let _ = writeln!(out, "  Detection rate:         {}%", m.detection_rate);
    let _ = writeln!(out, "  Quality pass rate:      {}%", m.quality_pass_rate);
    let _ = writeln!(out, "  Avg faces per session:  {}", m.avg_faces_per_session);
    let _ = writeln!(out, "  Overall efficiency:     {}%", m.overall_efficiency);

    if !page.rejection_chart.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Rejection Reasons");
        for slice in &page.rejection_chart {
            let _ = writeln!(out, "  {:<24} {:>6} {:>4}%", slice.name, slice.value, slice.percent);
        }
    }

    if !page.trend.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<12} | {:>9} | {:>7}", "Date", "Customers", "Visits");
        let _ = writeln!(out, "{}", "-".repeat(34));
        for point in &page.trend {
            let _ = writeln!(
                out,
                "{:<12} | {:>9} | {:>7}",
                point.date, point.unique_customers, point.total_visits
            );
        }
    }

    if !page.daily_metrics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<8} | {:>7} | {:>8} | {:>7}", "Day", "Faces", "Sessions", "Quality");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for point in &page.daily_metrics {
            let _ = writeln!(
                out,
                "{:<8} | {:>7} | {:>8} | {:>7}",
                point.day, point.faces, point.sessions, point.quality
            );
        }
    }

    if let Some(calendar) = &page.calendar {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:04}-{:02}", calendar.year, calendar.month);
        let _ = writeln!(out, " {}", crate::analytics::CalendarMonth::WEEKDAYS.join("  "));
        for week in calendar.weeks() {
            let line: Vec<String> = week
                .iter()
                .map(|cell| match cell {
                    Some(day) if day.has_data => format!("{:>3}*", day.day),
                    Some(day) => format!("{:>3} ", day.day),
                    None => "    ".to_string(),
                })
                .collect();
            let _ = writeln!(out, "{}", line.join(" ").trim_end());
        }
    }

    if let Some(day) = &page.selected {
        let _ = writeln!(out);
        let _ = writeln!(out, "Business Analytics for {}", day.date);
        let _ = writeln!(out, "  Unique customers:   {}", day.unique_customers);
        let _ = writeln!(out, "  Total visits:       {}", day.total_visits);
        let _ = writeln!(out, "  Repeat customers:   {}", day.repeat_customers);
        let _ = writeln!(out, "  Frequent visitors:  {}", day.frequent_visitors);
        let g = &day.gender_distribution;
        let _ = writeln!(
            out,
            "  Gender:             {} female, {} male, {} unknown",
            g.female, g.male, g.unknown
        );
        for group in AgeGroup::ALL {
            let count = day.age_groups.get(&group).copied().unwrap_or(0);
            let _ = writeln!(out, "  {:<28} {}", group.label(), count);
        }
    }
    out
}

pub fn search(page: &SearchPage, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let results = &page.response.results;

    if page.query.trim().is_empty() {
        let _ = writeln!(out, "Enter a session name or person id to search");
        return out;
    }
    if results.is_empty() {
        let _ = writeln!(out, "No exact match for \"{}\"", page.query);
        return out;
    }

    for result in results {
        let kind = match result.kind {
            crate::api::ResultKind::Session => "session",
            crate::api::ResultKind::Person => "person",
        };
        let _ = writeln!(
            out,
            "[{}] {}  {}  {} faces",
            kind,
            result.name,
            time_ago(result.timestamp.as_deref(), now),
            result.face_count
        );
        if let Some(quality) = result.quality_score {
            let _ = writeln!(out, "    quality: {}%", quality);
        }
        if let Some(sessions) = result.session_count {
            let _ = writeln!(out, "    sessions: {}", sessions);
        }
        for (key, value) in &result.metadata {
            let _ = writeln!(out, "    {}: {}", key, value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{OverallAnalytics, Person, Session};
    use crate::store::{Store, StoreStatus};

    fn now() -> DateTime<Utc> {
        time::parse_utc("2024-03-10T12:00:00Z").unwrap()
    }

    #[test]
    fn test_stores_marks_current() {
        let store = Store {
            id: "main".to_string(),
            name: "Main St".to_string(),
            location: "Downtown".to_string(),
            description: String::new(),
            api_endpoint: "http://main".to_string(),
            status: StoreStatus::Active,
        };
        let state = StoreState {
            stores: vec![store.clone()],
            current: Some(store),
            ..Default::default()
        };

        let text = stores(&state);
        assert!(text.lines().nth(2).unwrap().starts_with("* main"));
    }

    #[test]
    fn test_dashboard_empty_widgets() {
        let text = dashboard(
            &Dashboard::from_analytics(&OverallAnalytics::default(), ConnectionStatus::offline()),
            &LiveSessions::default(),
            &RecentVisitors::default(),
            now(),
        );
        assert!(text.contains("No active sessions"));
        assert!(text.contains("No recent visitors"));
        assert!(text.contains("Disconnected"));
    }

    #[test]
    fn test_dashboard_quality_panel() {
        let mut overall = OverallAnalytics {
            detection_rate: 92.0,
            quality_pass_rate: 70.5,
            ..Default::default()
        };
        overall.rejection_reasons.insert("low_quality_face".to_string(), 12);

        let text = dashboard(
            &Dashboard::from_analytics(&overall, ConnectionStatus::unknown()),
            &LiveSessions::default(),
            &RecentVisitors::default(),
            now(),
        );
        assert!(text.contains("Detection rate:     92%"));
        assert!(text.contains("Quality pass rate:  70.5%"));
        assert!(text.contains("low quality_face"));
        assert!(!text.contains("No rejections recorded"));
    }

    #[test]
    fn test_session_list_rows() {
        let mut list = SessionList::default();
        list.apply_page(
            0,
            vec![Session {
                session_name: "cam1".to_string(),
                face_count: Some(4),
                ..Default::default()
            }],
            None,
        );

        let text = session_list(&list, now());
        assert!(text.contains("cam1"));
        assert!(text.contains("Unknown"));
        assert!(text.trim_end().ends_with("1 loaded"));
    }

    #[test]
    fn test_missing_person() {
        let text = person_details(&PersonDetails::not_found("ghost"), now());
        assert_eq!(text.trim(), "Person not found: ghost");

        let mut list = PeopleList::default();
        list.apply_page(0, vec![Person::default()], None);
        list.set_filter("zzz");
        assert!(people_list(&list, now()).starts_with("No people found"));
    }
}
