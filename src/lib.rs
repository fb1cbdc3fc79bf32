//! Marketplace backend: shops, a product category tree, products, user
//! profiles and interaction-based recommendations over SQLite.
//!
//! The HTTP surface lives in [`api`]. Each handler builds the service it
//! needs from [`api::AppState`], which holds the database handle.

pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
