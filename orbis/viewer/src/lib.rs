//! Orbis viewer crate: wgpu upload and draw paths for the engine core.
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::dbg_macro, clippy::large_enum_variant)]

pub mod atlas_tex;
pub mod gpu;
pub mod line;

pub use atlas_tex::AtlasTexture;
pub use gpu::GpuContext;
pub use line::mesh::{padded_vertex_bytes, LineMeshGpu, VERTEX_PAD_BYTES};
pub use line::pipeline::{LineBinding, PolylineRenderer};
