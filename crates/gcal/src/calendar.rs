//! Calendar API v3 event operations.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GcalError, Result};
use crate::CALENDAR_API_BASE;

/// Authenticated handle to one calendar.
#[derive(Debug, Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    access_token: String,
    calendar_id: String,
}

/// Start or end of an event.
///
/// Timed events carry `date_time` + `time_zone`; all-day events carry `date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EventTime {
    /// A timed boundary in the given IANA time zone.
    pub fn timed(date: &str, time: &str, time_zone: &str) -> Self {
        Self {
            date_time: Some(format!("{date}T{time}:00")),
            time_zone: Some(time_zone.to_string()),
            date: None,
        }
    }
}

/// Body for event insert/patch calls. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
}

/// An event as returned by the Calendar API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl CalendarClient {
    /// Create a handle for the given calendar using a valid access token.
    pub fn new(access_token: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.into(),
            calendar_id: calendar_id.into(),
        }
    }

    /// The calendar this handle operates against.
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn events_url(&self) -> String {
        format!("{CALENDAR_API_BASE}/calendars/{}/events", self.calendar_id)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(GcalError::AuthExpired);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GcalError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// List non-cancelled events between two RFC 3339 instants.
    ///
    /// Expands recurring events (`singleEvents=true`) and follows pagination.
    pub async fn list_events(&self, time_min: &str, time_max: &str) -> Result<Vec<CalendarEvent>> {
        debug!(calendar = %self.calendar_id, %time_min, %time_max, "Listing events");

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.events_url())
                .bearer_auth(&self.access_token)
                .query(&[
                    ("timeMin", time_min),
                    ("timeMax", time_max),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                    ("maxResults", "250"),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp = Self::check(request.send().await?).await?;
            let body: EventListResponse = resp.json().await?;

            events.extend(
                body.items
                    .into_iter()
                    .filter(|e| e.status.as_deref() != Some("cancelled")),
            );

            page_token = body.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(events)
    }

    /// Create an event.
    pub async fn insert_event(&self, payload: &EventPayload) -> Result<CalendarEvent> {
        debug!(calendar = %self.calendar_id, "Inserting event");

        let resp = self
            .http
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    /// Patch an existing event. Unset payload fields are left as-is.
    pub async fn patch_event(&self, event_id: &str, payload: &EventPayload) -> Result<CalendarEvent> {
        debug!(calendar = %self.calendar_id, event = %event_id, "Patching event");

        let resp = self
            .http
            .patch(format!("{}/{event_id}", self.events_url()))
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await?;

        Ok(Self::check(resp).await?.json().await?)
    }

    /// Delete an event.
    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        debug!(calendar = %self.calendar_id, event = %event_id, "Deleting event");

        let resp = self
            .http
            .delete(format!("{}/{event_id}", self.events_url()))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_event_time() {
        let t = EventTime::timed("2026-03-14", "10:30", "America/Mexico_City");
        assert_eq!(t.date_time.as_deref(), Some("2026-03-14T10:30:00"));
        assert_eq!(t.time_zone.as_deref(), Some("America/Mexico_City"));
        assert!(t.date.is_none());
    }

    #[test]
    fn test_payload_skips_unset_fields() {
        let payload = EventPayload {
            summary: Some("Corte de cabello".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "summary": "Corte de cabello" }));
    }

    #[test]
    fn test_event_list_deserialization() {
        let body = r#"{
            "items": [
                { "id": "e1", "summary": "Cita", "status": "confirmed",
                  "start": { "dateTime": "2026-03-14T10:00:00-06:00" },
                  "end": { "dateTime": "2026-03-14T11:00:00-06:00" } },
                { "id": "e2", "status": "cancelled" }
            ]
        }"#;
        let parsed: EventListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].summary.as_deref(), Some("Cita"));
        assert!(parsed.next_page_token.is_none());
    }
}
