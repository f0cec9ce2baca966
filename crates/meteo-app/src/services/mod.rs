pub mod lookup_service;

pub use lookup_service::{request_lookup, LookupJob};
