//! GPU-resident buffers for one polyline mesh.

use engine::polyline::LineMesh;
use wgpu::util::DeviceExt;

/// Bytes of one duplicated vertex position (3 × f32).
pub const VERTEX_STRIDE: u64 = 12;

/// Byte offset between the prev/current/next views of the vertex buffer:
/// one logical point, i.e. four duplicates.
pub const NEIGHBOR_OFFSET: u64 = 4 * VERTEX_STRIDE;

/// Order tags align with the *current* duplicate, four entries in.
pub const ORDER_OFFSET: u64 = 4 * 4;

/// Spare tail appended to the vertex upload: the closing wrap quad of a
/// closed ring fetches its next-neighbor up to two duplicates past the end.
pub const VERTEX_PAD_BYTES: usize = 2 * VERTEX_STRIDE as usize;

/// Vertex bytes for upload, padded so every neighbor fetch stays in bounds.
#[must_use]
pub fn padded_vertex_bytes(mesh: &LineMesh) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(mesh.vertices.len() * 4 + VERTEX_PAD_BYTES);
    bytes.extend_from_slice(bytemuck::cast_slice(&mesh.vertices));
    bytes.resize(bytes.len() + VERTEX_PAD_BYTES, 0);
    bytes
}

/// Owns the vertex/order/index buffer handles for one polyline.
pub struct LineMeshGpu {
    /// Duplicated vertex positions, padded; bound three times at offsets.
    pub vertex_buf: wgpu::Buffer,
    /// Extrusion order tags.
    pub order_buf: wgpu::Buffer,
    /// Triangle-strip indices.
    pub index_buf: wgpu::Buffer,
    /// Number of strip indices to draw.
    pub index_count: u32,
}

impl LineMeshGpu {
    /// Create all three buffers from a built mesh.
    #[must_use]
    pub fn build(device: &wgpu::Device, mesh: &LineMesh) -> Self {
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("polyline vertices"),
            contents: &padded_vertex_bytes(mesh),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let order_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("polyline orders"),
            contents: bytemuck::cast_slice(&mesh.orders),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("polyline indices"),
            contents: bytemuck::cast_slice(&mesh.indexes),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_count = u32::try_from(mesh.indexes.len()).unwrap_or(u32::MAX);
        Self { vertex_buf, order_buf, index_buf, index_count }
    }

    /// Overwrite vertex positions in place after an equal-topology update.
    /// Buffer sizes are unchanged by construction, so no reallocation.
    pub fn write_vertices(&self, queue: &wgpu::Queue, mesh: &LineMesh) {
        queue.write_buffer(&self.vertex_buf, 0, bytemuck::cast_slice(&mesh.vertices));
    }

    /// Release the handles explicitly ahead of a rebuild or teardown, so a
    /// handle never outlives its replacement.
    pub fn release(&self) {
        self.vertex_buf.destroy();
        self.order_buf.destroy();
        self.index_buf.destroy();
    }
}
