//! Shared application state
//!
//! Built once at startup and cloned into every handler. Both halves are
//! immutable after construction, so unlimited concurrent readers are safe
//! and no request shares mutable state with another.

use std::sync::Arc;

use gantry_kube::ControlPlane;

use crate::requests::SchemaRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SchemaRegistry>,
    pub control: Arc<dyn ControlPlane>,
}

impl AppState {
    pub fn new(registry: SchemaRegistry, control: Arc<dyn ControlPlane>) -> Self {
        Self {
            registry: Arc::new(registry),
            control,
        }
    }
}
