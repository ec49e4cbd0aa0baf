pub mod analytics;
pub mod app;
pub mod config;
mod error;
pub mod mailing_list;
mod telemetry;
pub mod templ_manager;
pub mod web;

pub use app::{App, AppState};
pub use error::{Error, Result};
pub use mailing_list::MailingListClient;
pub use telemetry::{init_dbg_tracing, init_production_tracing};
pub use web::serve;
