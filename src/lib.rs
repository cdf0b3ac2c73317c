// Library target shared by the `lusodrill` binary, the integration tests
// and the criterion benches.

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod lesson;
pub mod session;
pub mod speech;
pub mod store;
pub mod telemetry;
pub mod ui;
