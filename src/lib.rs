pub mod app;
pub mod client;
pub mod clock;
pub mod config;
pub mod display;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod store;

pub use app::router;
pub use client::{AlarmApi, ApiClient, ClientError};
pub use config::ServerConfig;
pub use models::{Alarm, AlarmDraft};
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
pub use store::{AlarmStore, MutationError};
