//! Social graph and recommendation engine for a movie catalog.
//!
//! Users send and accept friend requests, like films, get film
//! recommendations from users with similar taste and read an activity feed
//! of what they did. User, film and review records themselves belong to other
//! services and are only referenced by id.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
