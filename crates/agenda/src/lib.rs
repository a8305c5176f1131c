//! Calendar integration core.
//!
//! Ties the token store, the Google client, and the Retell client together:
//!
//! - [`resolver`] produces an authenticated calendar handle for a client,
//!   refreshing stored credentials transparently.
//! - [`registrar`] makes a client's voice agent capable of invoking the four
//!   calendar operations through webhook endpoints, idempotently, and can
//!   undo that registration.
//! - [`reconcile`] and [`prompt`] hold the pure merge logic the registrar
//!   is built on.

pub mod error;
pub mod prompt;
pub mod reconcile;
pub mod registrar;
pub mod resolver;
pub mod tools;

pub use error::AgendaError;
pub use registrar::{register_calendar_tools, unregister_calendar_tools};
pub use resolver::resolve_calendar;
pub use tools::CalendarTool;
