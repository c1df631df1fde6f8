pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod dimensions;
pub mod error;
pub mod generator;
pub mod placeholder;
pub mod web_pages;
