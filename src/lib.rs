pub mod core;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod stores;
pub mod utils;
pub mod validation;
