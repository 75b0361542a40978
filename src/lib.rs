pub mod app;
pub mod chat;
pub mod config;
pub mod event;
pub mod gateway;
pub mod identity;
pub mod logging;
pub mod markdown;
pub mod redirect;
pub mod ui;

pub use app::App;
