//! Student attendance tracker.
//!
//! A JWT-gated REST service storing one present/absent record per student and
//! day plus per-subject attended/total counters, and a [`client`] library that
//! keeps a local subject board in sync with it.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod models;
pub mod routes;
pub mod server;
pub mod store;
