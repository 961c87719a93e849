//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::BackendId`]: identifier of a configured analysis backend
//! - [`value::AnalysisValue`]: tagged value model for parsed replies
//! - [`error::DomainError`]: domain-level errors

pub mod backend;
pub mod error;
pub mod value;
