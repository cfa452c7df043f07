//! Typed client for the HTTP API plus a small synchronized view of server
//! state. The mirror holds plain data and is updated through explicit
//! transition functions; it never mutates itself behind the caller's back.

pub mod api;
pub mod mirror;
