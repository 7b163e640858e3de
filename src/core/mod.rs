//! Core modules: validation, upstream API, fetch pipeline

pub mod fetcher;
pub mod validator;
pub mod youtube;
