//! HTTP surface of the catalog: REST routes, health probe and startup wiring.

pub mod api;
pub mod bootstrap;
pub mod health;
