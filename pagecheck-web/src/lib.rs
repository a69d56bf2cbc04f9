//! Pagecheck web layer — axum routing, server-rendered pages, and
//! transient flash messaging over the `pagecheck-core` subsystems.

pub mod app;
pub mod flash;
pub mod pages;
