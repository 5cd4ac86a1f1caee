//! # arks-schema
//!
//! Shared types for the arks redirector: the platform model with wildcard
//! expansion, ordered platform bindings with scored resolution, version
//! lines, resolved items and request identifiers.
//!
//! Nothing in this crate touches the filesystem.

pub mod binding;
pub mod item;
pub mod platform;
pub mod version;

pub use binding::{PlatformMap, score};
pub use item::{Item, Request, RequestError, origin};
pub use platform::{ARCH_WILDCARDS, Arch, Os, Platform, Variant, WILDCARD};
pub use version::Version;
