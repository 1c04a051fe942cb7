//! Route handlers for the REST API.

pub mod fitdegree;
pub mod health;
