pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod effects;
pub mod logging;
pub mod scheduler;
pub mod ui;
