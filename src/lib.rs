pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod sync;
pub mod tracker;
pub mod ui;
pub mod views;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use sync::{Session, SyncClient, SyncEvent};
pub use tracker::{ExpenseForm, Tracker};
