//! Person Details

use async_trait::async_trait;
use serde::Serialize;

use super::Page;
use crate::api::{ApiClient, ApiResult, Person};
use crate::time;

/// Sessions listed before the "showing N of M" note
pub const SHOWN_SESSIONS: usize = 10;

/// Figures derived from a person record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonSummary {
    pub gender: &'static str,
    pub total_visits: u64,
    pub total_faces: u64,
    pub session_count: u64,
    /// Whole days between first and last sighting, rounded up
    pub days_tracked: i64,
    pub shown_sessions: Vec<String>,
    /// Sessions beyond the shown ones
    pub hidden_sessions: usize,
    /// Engagement bars, each capped at 100
    pub visit_frequency: u64,
    pub session_engagement: u64,
    pub age_indicator: u64,
    pub tracking_duration: u64,
}

impl PersonSummary {
    pub fn from_person(person: &Person) -> Self {
        let session_count = person.session_total();
        let days_tracked = time::days_between(person.first_seen.as_deref(), person.last_seen.as_deref());

        Self {
            gender: person.gender.label(),
            total_visits: person.total_visits,
            total_faces: person.face_total(),
            session_count,
            days_tracked,
            shown_sessions: person.sessions.iter().take(SHOWN_SESSIONS).cloned().collect(),
            hidden_sessions: person.sessions.len().saturating_sub(SHOWN_SESSIONS),
            visit_frequency: capped(person.total_visits.saturating_mul(10)),
            session_engagement: capped((person.sessions.len() as u64).saturating_mul(20)),
            age_indicator: if person.average_age > 0.0 {
                capped((person.average_age * 2.0) as u64)
            } else {
                0
            },
            tracking_duration: capped(days_tracked.max(0) as u64 * 5),
        }
    }

    /// "Showing 10 of N sessions" when the list is truncated
    pub fn truncation_note(&self) -> Option<String> {
        (self.hidden_sessions > 0).then(|| {
            format!(
                "Showing {} of {} sessions",
                self.shown_sessions.len(),
                self.shown_sessions.len() + self.hidden_sessions
            )
        })
    }
}

fn capped(value: u64) -> u64 {
    value.min(100)
}

/// Person details page; `person` is `None` when the backend has no such id
#[derive(Debug, Clone, Serialize)]
pub struct PersonDetails {
    pub person_id: String,
    pub person: Option<Person>,
    pub summary: Option<PersonSummary>,
}

impl PersonDetails {
    pub fn not_found(person_id: &str) -> Self {
        Self {
            person_id: person_id.to_string(),
            person: None,
            summary: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.person.is_some()
    }
}

#[async_trait]
impl Page for PersonDetails {
    const NAME: &'static str = "person_details";
    type Params = String;

    async fn fetch(api: &ApiClient, person_id: &String) -> ApiResult<Self> {
        let response = api.get_person_details(person_id).await?;
        Ok(match response.person {
            Some(person) => Self {
                person_id: person_id.clone(),
                summary: Some(PersonSummary::from_person(&person)),
                person: Some(person),
            },
            None => Self::not_found(person_id),
        })
    }

    fn fallback(person_id: &String) -> Self {
        Self::not_found(person_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Gender;

    #[test]
    fn test_summary() {
        let person = Person {
            person_id: "p-42".to_string(),
            total_visits: 3,
            total_faces: 17,
            sessions: (0..12).map(|i| format!("s{}", i)).collect(),
            first_seen: Some("2024-03-01T08:00:00".to_string()),
            last_seen: Some("2024-03-03T09:00:00".to_string()),
            average_age: 31.0,
            gender: Gender::Male,
            ..Default::default()
        };

        let summary = PersonSummary::from_person(&person);
        assert_eq!(summary.gender, "Male");
        assert_eq!(summary.session_count, 12);
        assert_eq!(summary.days_tracked, 3);
        assert_eq!(summary.shown_sessions.len(), 10);
        assert_eq!(summary.hidden_sessions, 2);
        assert_eq!(summary.truncation_note().as_deref(), Some("Showing 10 of 12 sessions"));
        assert_eq!(summary.visit_frequency, 30);
        assert_eq!(summary.session_engagement, 100);
        assert_eq!(summary.age_indicator, 62);
        assert_eq!(summary.tracking_duration, 15);
    }

    #[test]
    fn test_summary_without_dates() {
        let summary = PersonSummary::from_person(&Person::default());
        assert_eq!(summary.days_tracked, 0);
        assert_eq!(summary.gender, "Unknown");
        assert!(summary.truncation_note().is_none());
    }
}
