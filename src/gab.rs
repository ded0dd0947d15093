//! Gab API clients and services for communicating with Gab over HTTP.

pub mod client;
pub mod paginate;
pub mod service;

pub use client::{ClientSettings, GabClient};
pub use paginate::Paginator;
