//! HTTP API handlers for wildmap-xp

pub mod health;
pub mod recordings;

pub use health::health_routes;
pub use recordings::{proxy_recordings, recordings_routes};
