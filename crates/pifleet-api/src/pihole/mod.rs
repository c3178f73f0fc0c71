pub mod actions;
pub mod auth;
pub mod client;
pub mod entities;
pub mod models;
pub mod stats;

pub use client::PiholeClient;
