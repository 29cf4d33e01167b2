//! aiswitch Core Types
//!
//! This crate provides the data model and edit logic behind the aiswitch console:
//! - Provider and preset configuration types
//! - Override editing with key validation and value coercion
//! - Provider/preset reconciliation into mutation payloads
//! - Request log types and chat transcript reconstruction

pub mod editor;
pub mod error;
pub mod log;
pub mod mutation;
pub mod provider;
pub mod reconcile;
pub mod transcript;

pub use error::{Error, FieldError, Result, ValidationErrors};
