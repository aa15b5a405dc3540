pub mod clamp;
pub mod config;
pub mod constants;
pub mod controller;
pub mod geo;
pub mod state;
pub mod viewport;
