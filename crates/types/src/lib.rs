//! Foundation types shared by every reportflow crate.
//!
//! - **value**: the tagged value model used for raw inputs and bound parameters
//! - **target**: output target identifiers and the mime tables that select them
//! - **config** / **boot**: process-wide engine configuration

pub mod boot;
pub mod config;
pub mod target;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use target::{OutputTarget, mime, mime_for_extension};
pub use value::{
    InputSet, InputValue, ResultSet, ScalarType, SharedBytes, TableModel, Value, ValueType,
};
