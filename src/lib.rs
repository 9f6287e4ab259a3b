pub mod config;
pub mod error;
pub mod models;
pub mod selector;
pub mod services;
pub mod controllers;

use std::sync::Arc;

use models::SeatElement;

// Shared state для всего приложения
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: config::Config,
    /// Схема зала строится один раз при старте и отдаётся каждой странице.
    pub layout: Vec<SeatElement>,
}

impl AppState {
    pub fn new(config: config::Config) -> Arc<Self> {
        let layout = services::layout::build_layout(&config.booking);
        Arc::new(Self { config, layout })
    }
}
