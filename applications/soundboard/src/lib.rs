//! MLC Soundboard application
//!
//! Terminal front end for the sound bank plus the server that keeps the web
//! shell available offline.

pub mod commands;
pub mod config;
pub mod database;
pub mod input;
pub mod view;
