pub mod client;
pub mod events;
pub mod models;

pub use client::{ApiClient, DEFAULT_LIMIT};
pub use models::Message;
