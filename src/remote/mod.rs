//! Remote CRUD gateway over the hosted backend.

mod gateway;
mod rest;

pub use gateway::{Identity, RecordGateway};
pub use rest::RestGateway;
