//! WebSocket HTTP handlers for the web layer.
//!
//! This module only upgrades requests and shuttles frames between the socket
//! and a hub. Room membership and relaying live in the `realtime` crate.

pub mod handler;
