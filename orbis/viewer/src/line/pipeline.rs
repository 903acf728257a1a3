//! Render and picking pipelines for screen-space-extruded polylines.
//!
//! The same vertex buffer is bound three times at offsets of one logical
//! point, giving the shader prev/current/next positions without extra
//! attributes; the order tag picks the extrusion side and segment. Uploads
//! happen in `sync` (before a pass, resolving the entity's dirty states);
//! `draw`/`draw_picking` only record into an open pass and are no-ops for
//! invisible or empty polylines.

use wgpu::util::DeviceExt;

use super::mesh::{LineMeshGpu, NEIGHBOR_OFFSET, ORDER_OFFSET, VERTEX_STRIDE};
use engine::entity::{BufferKind, EntityError, Polyline};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct LineGlobals {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
    picking_color: [f32; 4],
    viewport: [f32; 2],
    thickness: f32,
    _pad: f32,
}

/// Per-polyline GPU state: uniform buffer, bind group, mesh buffers.
pub struct LineBinding {
    /// Uniform buffer holding `LineGlobals`.
    pub uniform_buf: wgpu::Buffer,
    /// Bind group over the uniform buffer.
    pub bind_group: wgpu::BindGroup,
    /// Mesh buffers; `None` until the first sync.
    pub mesh: Option<LineMeshGpu>,
}

/// Shared pipelines for every polyline in a scene.
pub struct PolylineRenderer {
    /// Textured/blended color pipeline.
    pub color_pipeline: wgpu::RenderPipeline,
    /// Solid picking-color pipeline: no blending, no culling.
    pub picking_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl PolylineRenderer {
    /// Build both pipelines against the given color target format.
    #[must_use]
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("line bgl globals"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    min_binding_size: None,
                    has_dynamic_offset: false,
                },
                count: None,
            }],
        });

        let vert = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line vert"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/line.vert.wgsl").into()),
        });
        let frag = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line frag"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/line.frag.wgsl").into()),
        });
        let frag_picking = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line frag picking"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/line_picking.frag.wgsl").into(),
            ),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let position = |location: u32| wgpu::VertexAttribute {
            shader_location: location,
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
        };
        let prev_attrs = [position(0)];
        let cur_attrs = [position(1)];
        let next_attrs = [position(2)];
        let order_attrs = [wgpu::VertexAttribute {
            shader_location: 3,
            format: wgpu::VertexFormat::Float32,
            offset: 0,
        }];
        let vertex_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &prev_attrs,
            },
            wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &cur_attrs,
            },
            wgpu::VertexBufferLayout {
                array_stride: VERTEX_STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &next_attrs,
            },
            wgpu::VertexBufferLayout {
                array_stride: 4,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &order_attrs,
            },
        ];

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: Some(wgpu::IndexFormat::Uint32),
            cull_mode: None,
            ..Default::default()
        };

        let color_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vert,
                entry_point: "main",
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &frag,
                entry_point: "main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive,
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let picking_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line picking pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vert,
                entry_point: "main",
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &frag_picking,
                entry_point: "main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive,
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self { color_pipeline, picking_pipeline, bind_group_layout }
    }

    /// Allocate the per-polyline uniform buffer and bind group.
    #[must_use]
    pub fn create_binding(&self, device: &wgpu::Device) -> LineBinding {
        let globals = LineGlobals {
            view_proj: [[0.0; 4]; 4],
            color: [1.0; 4],
            picking_color: [0.0; 4],
            viewport: [1.0, 1.0],
            thickness: 1.0,
            _pad: 0.0,
        };
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line uniforms"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("line bg"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });
        LineBinding { uniform_buf, bind_group, mesh: None }
    }

    /// Push the frame's camera and the polyline's style into the uniforms.
    pub fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        binding: &LineBinding,
        view_proj: [[f32; 4]; 4],
        viewport: [f32; 2],
        line: &Polyline,
    ) {
        let pick = line.picking_color();
        let globals = LineGlobals {
            view_proj,
            color: line.color(),
            picking_color: [pick[0], pick[1], pick[2], 1.0],
            viewport,
            thickness: line.thickness(),
            _pad: 0.0,
        };
        queue.write_buffer(&binding.uniform_buf, 0, bytemuck::bytes_of(&globals));
    }

    /// Resolve pending uploads ahead of a render pass.
    ///
    /// A dirty index buffer (topology change) releases the old handles and
    /// rebuilds all three buffers; a dirty vertex buffer alone (equal
    /// topology) is overwritten in place. Errors if the polyline was never
    /// attached.
    pub fn sync(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        line: &mut Polyline,
        binding: &mut LineBinding,
    ) -> Result<(), EntityError> {
        let rebuild = line.needs_upload(BufferKind::Indexes)? || binding.mesh.is_none();
        let rewrite = line.needs_upload(BufferKind::Vertices)?;
        if line.mesh().is_empty() {
            return Ok(());
        }
        if rebuild {
            if let Some(old) = binding.mesh.take() {
                old.release();
            }
            binding.mesh = Some(LineMeshGpu::build(device, line.mesh()));
            line.mark_uploaded(BufferKind::Indexes);
            line.mark_uploaded(BufferKind::Vertices);
        } else if rewrite {
            if let Some(mesh) = &binding.mesh {
                mesh.write_vertices(queue, line.mesh());
            }
            line.mark_uploaded(BufferKind::Vertices);
        }
        Ok(())
    }

    /// Record the blended color draw. No-op when invisible or empty.
    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        binding: &'a LineBinding,
        line: &Polyline,
    ) {
        self.draw_with(rpass, binding, line, &self.color_pipeline);
    }

    /// Record the solid picking draw. No-op when invisible or empty.
    pub fn draw_picking<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        binding: &'a LineBinding,
        line: &Polyline,
    ) {
        self.draw_with(rpass, binding, line, &self.picking_pipeline);
    }

    fn draw_with<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        binding: &'a LineBinding,
        line: &Polyline,
        pipeline: &'a wgpu::RenderPipeline,
    ) {
        if !line.visible() {
            return;
        }
        let Some(mesh) = &binding.mesh else {
            return;
        };
        if mesh.index_count == 0 {
            return;
        }
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &binding.bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
        rpass.set_vertex_buffer(1, mesh.vertex_buf.slice(NEIGHBOR_OFFSET..));
        rpass.set_vertex_buffer(2, mesh.vertex_buf.slice(2 * NEIGHBOR_OFFSET..));
        rpass.set_vertex_buffer(3, mesh.order_buf.slice(ORDER_OFFSET..));
        rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
