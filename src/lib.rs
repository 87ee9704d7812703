pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod input;
pub mod model;
pub mod stream;
pub mod ui;
