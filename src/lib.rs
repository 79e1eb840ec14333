pub mod bot;
pub mod config;
pub mod providers;
pub mod webhook;
