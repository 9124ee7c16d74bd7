//! Gantry API - Request handling for the Gantry API server
//!
//! The flow for every operation is the same four steps:
//!
//! 1. assemble - the transport entry point builds an untyped `Document`
//!    (`extract`), rejecting shape problems (content type, decode, size)
//!    with their own error codes before validation ever runs
//! 2. validate - the gantry-core engine checks the document against the
//!    operation's schema (`requests`) and decodes the typed DTO
//! 3. project - the DTO maps deterministically into a resource spec
//!    (`project`); the only defaults are the documented fallbacks
//! 4. submit - the spec goes to the control plane (`gantry-kube`), and the
//!    stored object or error comes back in a stable envelope (`response`)
//!
//! Handlers contain no business logic beyond this sequence.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod project;
pub mod requests;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use requests::SchemaRegistry;
pub use router::router;
pub use state::AppState;
