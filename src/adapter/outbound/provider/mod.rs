//! Provider adapters: HTTP clients per airline inventory service.

pub mod alpha;
pub mod beta;
pub mod dto;
pub mod http;
pub mod router;
pub mod settings;
