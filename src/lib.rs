//! Telemetry viewer building blocks: the `/data` endpoint, a client that
//! loads and extends metric intervals from it, and a view that keeps map
//! markers and a member list in sync.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
