//! Greenlight domain core.
//!
//! Entity definitions, the field-error accumulator and the validation rules
//! for the movie catalog. Nothing in this crate performs I/O.

pub mod error;
pub mod filters;
pub mod movie;
pub mod runtime;
pub mod types;
pub mod validator;
