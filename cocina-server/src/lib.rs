pub mod cache;
pub mod config;
pub mod errors;
pub mod i18n;
pub mod pages;
pub mod routes;

pub use pages::AppState;
pub use routes::app;
