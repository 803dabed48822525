//! Wire types for the grid worker driver protocol.
//!
//! This crate contains the serde-serializable types the hub exchanges with
//! a remote worker over HTTP: the multi-valued command parameter map posted
//! to the driver endpoint, and the status/body pair the worker answers with.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond construction, access, and encoding
//! - **1:1 with the wire**: Match what actually travels over HTTP
//! - **Stable**: Changes only when the wire protocol changes
//!
//! The proxy behavior built on top of these types lives in `grid-core`.

pub mod command;
pub mod response;

pub use command::*;
pub use response::*;
