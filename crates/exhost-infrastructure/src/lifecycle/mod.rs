//! Flow lifecycle management
//!
//! | Type | Role |
//! |------|------|
//! | [`FlowLifecycleController`] | Owns the single active flow |
//! | [`FlowHandle`] | One flow with its window and scope |

pub mod controller;
pub mod handle;

pub use controller::FlowLifecycleController;
pub use handle::{FlowHandle, FlowId};
