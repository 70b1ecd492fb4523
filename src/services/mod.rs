pub mod activity_log;
pub mod markdown;
pub mod metrics_manager;
pub mod normalizer;
pub mod session_manager;
pub mod webhook;
