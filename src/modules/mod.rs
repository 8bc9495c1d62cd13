//! Modules layer - Infrastructure components for external integrations
//!
//! Clients and adapters for object storage, server-side RPC procedures and
//! the realtime publish/subscribe hub.

pub mod realtime;
pub mod rpc;
pub mod storage;
