//! Pagecheck core library — URL normalization, registry, page checker,
//! and the SQLite-backed check history store.
//!
//! The main entry points are [`normalize::normalize`] for canonicalizing
//! user input, [`store::UrlStore`] for persistence, and
//! [`checker::Checker`] for running a fetch-and-record check.

pub mod checker;
pub mod config;
pub mod error;
pub mod normalize;
pub mod store;
pub mod types;
