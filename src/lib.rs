//! Movie catalog API that ranks admin reviews by sentiment and recommends
//! movies from a user's favourite genres.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
