pub mod cache;
pub mod config;
pub mod critique;
pub mod generate;
pub mod validate;
