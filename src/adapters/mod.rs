//! Adapter implementations of the port traits.
//!
//! `live` talks to the real machine; `memory` holds scripted stand-ins that
//! tests wire into a [`crate::context::ServiceContext`].

pub mod live;
pub mod memory;
