//! MedRecord patient portal — terminal interface.
//!
//! Provides the portal screen in a terminal:
//! - Analysis lookup by reference number
//! - Results view with diagnosis, confidence and recommended action
//! - PDF report download
//! - Quick actions and health tips

pub mod app;
pub mod input;
pub mod logging;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use theme::Theme;
