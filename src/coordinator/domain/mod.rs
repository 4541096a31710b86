//! Inbound request types.

mod request;

pub use request::TaskRequest;
