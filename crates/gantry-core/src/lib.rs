//! Gantry Core - Validation core for the Gantry API server
//!
//! This crate provides the transport-agnostic half of the request pipeline:
//! - `Document`: the untyped request tree, however it arrived
//! - `Schema`: declarative request shapes with unions and constraints
//! - `engine`: one generic walker that validates documents against schemas
//! - `validators`: domain-specific field predicates (DNS names, kubeconfig,
//!   cron schedules, URLs)
//! - `Patch`: tri-state optionals for partial updates

pub mod document;
pub mod engine;
pub mod error;
pub mod kubeconfig;
pub mod patch;
pub mod schema;
pub mod validators;

pub use document::Document;
pub use engine::{validate, validate_into};
pub use error::{CoreError, Result, Violation, ViolationReport};
pub use kubeconfig::Kubeconfig;
pub use patch::Patch;
pub use schema::{Check, Exclusivity, Field, Kind, ObjectCheck, Schema, UnionSchema};
