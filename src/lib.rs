pub mod app;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod firestore;
pub mod handlers;
pub mod models;
pub mod range;
pub mod session;
pub mod state;
pub mod store;
pub mod table;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
