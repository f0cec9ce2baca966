//! Terminal front end for meteo.
//!
//! The main thread owns the [`model::SearchModel`] and reacts to
//! [`AppEvent`]s: submitted lines from the input thread and stage results
//! from lookups running on the tokio runtime.

pub mod app_services;
pub mod error_mapping;
pub mod event_loop;
pub mod input;
pub mod model;
pub mod render;
pub mod services;
pub mod settings;

pub use app_services::AppServices;
pub use input::InputEvent;
pub use model::SearchModel;
pub use render::{Labels, RenderOptions, Report};

use meteo_weather::StageEvent;

/// Messages delivered to the main thread
#[derive(Debug)]
pub enum AppEvent {
    Input(InputEvent),
    Lookup(StageEvent),
}
