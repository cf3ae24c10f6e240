// Licensed under the Apache-2.0 license

//! Elaborated register tree and the read-only register-map model.
//!
//! The upstream register-description compiler produces a fully elaborated
//! tree (see [`tree`]); this crate loads it and exposes the single ordered
//! view of registers and fields that every generator consumes.
//!
//! ## Module Organization
//!
//! - [`access`]: Software/hardware access policies and side effects
//! - [`tree`]: Elaborated tree node types and loading
//! - [`map`]: Ordered register and field queries ([`RegisterMap`])
//! - [`walker`]: Depth-first walk with listener callbacks

pub mod access;
pub mod map;
pub mod tree;
pub mod walker;

pub use access::{AccessType, OnReadType, OnWriteType};
pub use map::{RegisterMap, RegisterRef};
pub use tree::{AddrMap, Block, Field, LoadError, Node, Register};
pub use walker::{Component, Listener, Walker};
