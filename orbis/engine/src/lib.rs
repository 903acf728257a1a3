//! Orbis engine crate: polyline tessellation and texture atlas packing.
//! CPU-side core; GPU upload and drawing live in the viewer crate.
#![deny(missing_docs)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::dbg_macro, clippy::large_enum_variant)]

pub mod atlas;
pub mod canvas;
pub mod entity;
pub mod ident;
pub mod polyline;

/// Returns the engine version string from Cargo metadata.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
