//! studio-site: static content builders and pack host for the YOUnique Yoga
//! studio site, backed by the FitDegree API.

pub mod builders;
pub mod cache;
pub mod config;
pub mod env_vars;
pub mod fitdegree;
pub mod logging;
pub mod packs;
pub mod render;
pub mod rest;
