//! Backend for the festival website: participants, events, registrations,
//! teams and the photo gallery, served as JSON for the single-page frontend.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
pub use web::build_router;
