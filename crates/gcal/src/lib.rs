//! Google OAuth2 and Calendar API v3 client.
//!
//! Direct HTTP via reqwest; no Google SDK. Covers the consent flow (URL
//! generation and code exchange), access token refresh, and event
//! operations against a named calendar.

pub mod auth;
pub mod calendar;
pub mod error;

pub use auth::{OauthConfig, RefreshedToken, TokenResponse};
pub use calendar::{CalendarClient, CalendarEvent, EventPayload, EventTime};
pub use error::GcalError;

/// OAuth scope required for full calendar read/write access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Google's OAuth consent endpoint.
pub const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's OAuth token endpoint.
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Base URL for Calendar API v3.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
