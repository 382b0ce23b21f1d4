//! Core taskdeck library (config, logging, session, request layer, resource clients).

pub mod api;
pub mod client;
pub mod config;
pub mod logging;
pub mod session;
