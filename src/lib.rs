pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod http;
pub mod models;
pub mod services;
pub mod store;
pub mod util;

pub use app::App;
