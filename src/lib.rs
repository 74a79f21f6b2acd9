pub mod aggregate;
pub mod app;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod errors;
pub mod figures;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use loader::load_datasets;
pub use state::AppState;
