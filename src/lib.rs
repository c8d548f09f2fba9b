pub mod app;
pub mod banner;
pub mod config;
pub mod error;
pub mod frontend;
pub mod handlers;
pub mod protocol;
pub mod upstream;
