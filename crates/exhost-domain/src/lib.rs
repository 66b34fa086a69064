//! # Extension Composition Host - Domain Layer
//!
//! Core types shared by every layer: contract identities, type-erased
//! service instances, the error taxonomy, and the port traits implemented
//! by the host (catalog, ambient services, flows, windows, logging).
//!
//! This crate has no knowledge of how services are resolved or how flows
//! are sequenced; that lives in `exhost-infrastructure`.

pub mod constants;
pub mod contract;
pub mod error;
pub mod ports;
pub mod service;

pub use contract::{Contract, ContractId, OwnerId, RegistrationId};
pub use error::{BoxError, Error, Result};
pub use service::{Disposable, ServiceInstance};
