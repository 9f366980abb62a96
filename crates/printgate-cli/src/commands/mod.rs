pub mod auth;
pub mod queue;
pub mod service;
pub mod settings;
