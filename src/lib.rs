//! Collects HTTP exchanges handed over by an intercepting proxy, filters
//! them by method, file type and URI substring, and exports raw requests
//! as `.http` files.
//!
//! All session state lives in [`capture::manager::CaptureManager`], owned by
//! a single thread behind [`capture::session::SessionHandle`]. The REST API
//! in [`api`] only translates HTTP calls into [`capture::manager::Action`]s.

pub mod api;
pub mod capture;
pub mod models;
pub mod utils;
