//! GPU texture upload for the atlas canvas.

use engine::canvas::Canvas;

/// GPU-side copy of the atlas canvas. Recreated after every repack; the old
/// handle is destroyed before the replacement is bound.
pub struct AtlasTexture {
    /// The RGBA8 texture.
    pub texture: wgpu::Texture,
    /// Default view over it.
    pub view: wgpu::TextureView,
    /// Edge length in pixels.
    pub size: u32,
}

impl AtlasTexture {
    /// Upload the canvas into a fresh texture.
    #[must_use]
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, canvas: &Canvas) -> Self {
        let size = canvas.width();
        let extent = wgpu::Extent3d { width: size, height: size, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("atlas texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_canvas(queue, &texture, canvas);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view, size }
    }

    /// Refresh after a repack: rewrite in place when the size matches,
    /// otherwise destroy and recreate.
    pub fn refresh(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, canvas: &Canvas) {
        if canvas.width() == self.size {
            write_canvas(queue, &self.texture, canvas);
        } else {
            self.texture.destroy();
            *self = Self::upload(device, queue, canvas);
        }
    }
}

fn write_canvas(queue: &wgpu::Queue, texture: &wgpu::Texture, canvas: &Canvas) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        canvas.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(canvas.width() * 4),
            rows_per_image: Some(canvas.height()),
        },
        wgpu::Extent3d {
            width: canvas.width(),
            height: canvas.height(),
            depth_or_array_layers: 1,
        },
    );
}
