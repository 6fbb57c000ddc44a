// Adapters layer: concrete implementations for external systems (HTTP API, local disk).

pub mod http;
pub mod storage;
