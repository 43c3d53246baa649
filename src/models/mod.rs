//! Models Module
//!
//! Request and response DTOs for the gateway control plane.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
