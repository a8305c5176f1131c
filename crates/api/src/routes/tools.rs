//! Agent tool registration routes and the calendar tool endpoints the
//! voice platform invokes during calls.
//!
//! Tool endpoints are authorized solely by the opaque `token` query
//! parameter, resolved back to a client record. Lookup misses are a 401,
//! never a crash, since the platform retries with whatever URL it has.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use database::{client, Client};
use gcal::{CalendarClient, CalendarEvent, EventPayload, EventTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// How far ahead to search for an appointment when the caller doesn't
/// remember its original date.
const SEARCH_HORIZON_DAYS: i64 = 90;

/// Request to register or unregister a client's calendar tools.
#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub client_id: String,
}

/// Generic acknowledgement body.
#[derive(Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// Register the four calendar tools on the client's agent.
pub async fn register_api(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<AckResponse>> {
    agenda::register_calendar_tools(
        state.db.pool(),
        &state.config.retell_api_base,
        &state.config.public_base_url,
        &req.client_id,
    )
    .await?;

    Ok(Json(AckResponse {
        success: true,
        message: "Calendar tools registered".to_string(),
    }))
}

/// Remove the calendar tools from the client's agent.
pub async fn unregister_api(
    State(state): State<AppState>,
    Json(req): Json<RegistrationRequest>,
) -> Result<Json<AckResponse>> {
    agenda::unregister_calendar_tools(
        state.db.pool(),
        &state.config.retell_api_base,
        &req.client_id,
    )
    .await?;

    Ok(Json(AckResponse {
        success: true,
        message: "Calendar tools unregistered".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Tool endpoints
// ---------------------------------------------------------------------------

/// Resolve the webhook token to a client and an authenticated calendar.
async fn resolve_caller(state: &AppState, token: &str) -> Result<(Client, CalendarClient)> {
    let record = client::find_by_webhook_token(state.db.pool(), token)
        .await?
        .ok_or(ApiError::UnknownWebhookToken)?;

    let calendar =
        agenda::resolve_calendar(state.db.pool(), &state.config.oauth, &record.id).await?;

    Ok((record, calendar))
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate> {
    value
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{field} must be an ISO date (YYYY-MM-DD)")))
}

fn parse_time(value: &str, field: &'static str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ApiError::BadRequest(format!("{field} must be a 24h time (HH:MM)")))
}

/// Local midnight of `date` in `tz`, rendered as RFC 3339 with the zone's
/// offset. Midnight can fall in a DST gap; UTC midnight is the fallback.
fn day_start(date: NaiveDate, tz: Tz) -> String {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .to_rfc3339()
}

/// RFC 3339 bounds covering `from` through `to`, both inclusive, with the
/// days delimited in the configured event time zone. Events are created
/// with local wall-clock times, so searching with UTC day boundaries would
/// miss evening appointments.
fn range_bounds(from: NaiveDate, to: NaiveDate, tz: Tz) -> (String, String) {
    (day_start(from, tz), day_start(to + Duration::days(1), tz))
}

/// Whether an event belongs to the named attendee: the name appears in the
/// summary or description, case-insensitively.
fn matches_attendee(event: &CalendarEvent, attendee_name: &str) -> bool {
    let needle = attendee_name.to_lowercase();
    let in_field = |field: &Option<String>| {
        field
            .as_deref()
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    };
    in_field(&event.summary) || in_field(&event.description)
}

async fn find_attendee_events(
    calendar: &CalendarClient,
    from: NaiveDate,
    to: NaiveDate,
    tz: Tz,
    attendee_name: &str,
) -> Result<Vec<CalendarEvent>> {
    let (time_min, time_max) = range_bounds(from, to, tz);
    let events = calendar.list_events(&time_min, &time_max).await?;

    Ok(events
        .into_iter()
        .filter(|e| matches_attendee(e, attendee_name))
        .collect())
}

fn event_boundary(time: &Option<EventTime>) -> String {
    time.as_ref()
        .and_then(|t| t.date_time.clone().or_else(|| t.date.clone()))
        .unwrap_or_default()
}

// --- consultar_agenda -------------------------------------------------------

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub token: String,
    pub date_from: String,
    pub date_to: Option<String>,
}

#[derive(Serialize)]
pub struct EventSummary {
    pub summary: String,
    pub start: String,
    pub end: String,
}

#[derive(Serialize)]
pub struct ListEventsResponse {
    pub success: bool,
    pub events: Vec<EventSummary>,
}

/// List appointments in a date range. `date_to` defaults to `date_from`.
pub async fn list_events_api(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<ListEventsResponse>> {
    let (_, calendar) = resolve_caller(&state, &query.token).await?;

    let from = parse_date(&query.date_from, "date_from")?;
    let to = match &query.date_to {
        Some(value) => parse_date(value, "date_to")?,
        None => from,
    };

    let (time_min, time_max) = range_bounds(from, to, state.config.event_time_zone);
    let events = calendar.list_events(&time_min, &time_max).await?;

    let events = events
        .iter()
        .map(|e| EventSummary {
            summary: e.summary.clone().unwrap_or_default(),
            start: event_boundary(&e.start),
            end: event_boundary(&e.end),
        })
        .collect();

    Ok(Json(ListEventsResponse {
        success: true,
        events,
    }))
}

// --- agendar_cita -----------------------------------------------------------

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub summary: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub description: Option<String>,
    pub attendee_name: Option<String>,
    pub attendee_phone: Option<String>,
}

/// Create an appointment.
pub async fn create_event_api(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<AckResponse>> {
    let (_, calendar) = resolve_caller(&state, &query.token).await?;

    parse_date(&req.date, "date")?;
    parse_time(&req.start_time, "start_time")?;
    parse_time(&req.end_time, "end_time")?;

    let summary = match &req.attendee_name {
        Some(name) => format!("{} - {}", req.summary, name),
        None => req.summary.clone(),
    };

    let mut notes: Vec<String> = Vec::new();
    if let Some(ref description) = req.description {
        notes.push(description.clone());
    }
    if let Some(ref name) = req.attendee_name {
        notes.push(format!("Cliente: {name}"));
    }
    if let Some(ref phone) = req.attendee_phone {
        notes.push(format!("Teléfono: {phone}"));
    }

    let tz = state.config.event_time_zone;
    let payload = EventPayload {
        summary: Some(summary),
        description: (!notes.is_empty()).then(|| notes.join("\n")),
        start: Some(EventTime::timed(&req.date, &req.start_time, tz.name())),
        end: Some(EventTime::timed(&req.date, &req.end_time, tz.name())),
    };

    let event = calendar.insert_event(&payload).await?;
    info!(event_id = %event.id, "Appointment created");

    Ok(Json(AckResponse {
        success: true,
        message: format!(
            "Cita agendada para el {} de {} a {}",
            req.date, req.start_time, req.end_time
        ),
    }))
}

// --- reagendar_cita ---------------------------------------------------------

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub attendee_name: String,
    pub new_date: String,
    pub new_start_time: String,
    pub new_end_time: String,
    pub original_date: Option<String>,
}

/// Move an existing appointment to a new date and time.
pub async fn update_event_api(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<AckResponse>> {
    let (_, calendar) = resolve_caller(&state, &query.token).await?;

    let new_date = parse_date(&req.new_date, "new_date")?;
    parse_time(&req.new_start_time, "new_start_time")?;
    parse_time(&req.new_end_time, "new_end_time")?;

    let tz = state.config.event_time_zone;
    let (from, to) = match &req.original_date {
        Some(value) => {
            let day = parse_date(value, "original_date")?;
            (day, day)
        }
        None => {
            let today = Utc::now().with_timezone(&tz).date_naive();
            (today, today + Duration::days(SEARCH_HORIZON_DAYS))
        }
    };

    let matches = find_attendee_events(&calendar, from, to, tz, &req.attendee_name).await?;
    let Some(event) = matches.first() else {
        return Ok(Json(AckResponse {
            success: false,
            message: format!("No encontré una cita a nombre de {}", req.attendee_name),
        }));
    };

    let payload = EventPayload {
        start: Some(EventTime::timed(&req.new_date, &req.new_start_time, tz.name())),
        end: Some(EventTime::timed(&req.new_date, &req.new_end_time, tz.name())),
        ..Default::default()
    };
    calendar.patch_event(&event.id, &payload).await?;
    info!(event_id = %event.id, "Appointment rescheduled");

    Ok(Json(AckResponse {
        success: true,
        message: format!(
            "Cita de {} movida al {} de {} a {}",
            req.attendee_name, new_date, req.new_start_time, req.new_end_time
        ),
    }))
}

// --- cancelar_cita ----------------------------------------------------------

#[derive(Deserialize)]
pub struct DeleteEventRequest {
    pub attendee_name: String,
    pub date: String,
}

/// Cancel an appointment.
pub async fn delete_event_api(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(req): Json<DeleteEventRequest>,
) -> Result<Json<AckResponse>> {
    let (_, calendar) = resolve_caller(&state, &query.token).await?;

    let day = parse_date(&req.date, "date")?;
    let matches = find_attendee_events(
        &calendar,
        day,
        day,
        state.config.event_time_zone,
        &req.attendee_name,
    )
    .await?;
    let Some(event) = matches.first() else {
        return Ok(Json(AckResponse {
            success: false,
            message: format!(
                "No encontré una cita a nombre de {} el {}",
                req.attendee_name, req.date
            ),
        }));
    };

    calendar.delete_event(&event.id).await?;
    info!(event_id = %event.id, "Appointment cancelled");

    Ok(Json(AckResponse {
        success: true,
        message: format!("Cita de {} el {} cancelada", req.attendee_name, req.date),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(summary: Option<&str>, description: Option<&str>) -> CalendarEvent {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "summary": summary,
            "description": description,
        }))
        .unwrap()
    }

    #[test]
    fn test_range_bounds_single_day_uses_local_midnights() {
        let day: NaiveDate = "2026-03-14".parse().unwrap();
        let (min, max) = range_bounds(day, day, chrono_tz::America::Mexico_City);
        assert_eq!(min, "2026-03-14T00:00:00-06:00");
        assert_eq!(max, "2026-03-15T00:00:00-06:00");
    }

    #[test]
    fn test_evening_local_appointment_falls_inside_its_day() {
        // A 19:00 Mexico City appointment starts at 01:00 UTC the next
        // calendar day; the single-day window must still contain it.
        let day: NaiveDate = "2026-03-14".parse().unwrap();
        let (min, max) = range_bounds(day, day, chrono_tz::America::Mexico_City);

        let start = chrono::DateTime::parse_from_rfc3339("2026-03-15T01:00:00Z").unwrap();
        let min = chrono::DateTime::parse_from_rfc3339(&min).unwrap();
        let max = chrono::DateTime::parse_from_rfc3339(&max).unwrap();
        assert!(min <= start && start < max);
    }

    #[test]
    fn test_matches_attendee_case_insensitive() {
        let e = event(Some("Corte de cabello - María López"), None);
        assert!(matches_attendee(&e, "maría lópez"));
        assert!(!matches_attendee(&e, "Juan"));
    }

    #[test]
    fn test_matches_attendee_in_description() {
        let e = event(Some("Cita"), Some("Cliente: Juan Pérez\nTeléfono: 555"));
        assert!(matches_attendee(&e, "Juan Pérez"));
    }

    #[test]
    fn test_matches_attendee_ignores_empty_fields() {
        let e = event(None, None);
        assert!(!matches_attendee(&e, "Juan"));
    }

    #[test]
    fn test_parse_time_rejects_non_24h() {
        assert!(parse_time("10:30", "start_time").is_ok());
        assert!(parse_time("10.30", "start_time").is_err());
        assert!(parse_time("25:00", "start_time").is_err());
    }
}
