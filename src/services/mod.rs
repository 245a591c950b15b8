//! Services Layer
//!
//! Business logic shared between the REST API handlers and anything else
//! that drives the dashboard. Handlers stay thin; the service owns the
//! refresh / save / push / export flows over `AppState`.

pub mod dashboard_service;

pub use dashboard_service::{
    DashboardService, PushResult, RefreshResult, SaveResult,
};
