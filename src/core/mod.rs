//! Platform-independent auth logic shared by the server and the browser bundle

pub mod auth;
pub mod config;
pub mod form;
pub mod guard;
pub mod session;
pub mod validation;
