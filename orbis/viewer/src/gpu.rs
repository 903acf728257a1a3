//! Headless GPU device/queue context shared by the render paths.

use std::sync::OnceLock;
use wgpu::{Device, Instance, Queue};

/// Owns the wgpu instance, device and queue the viewer renders with.
pub struct GpuContext {
    /// Instance used to create adapters
    pub instance: Instance,
    /// Logical device
    pub device: Device,
    /// Submission queue
    pub queue: Queue,
}

impl GpuContext {
    /// Create a context on a high-performance adapter with default limits.
    pub async fn new() -> Self {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .unwrap_or_else(|| panic!("no suitable GPU adapters"));
        println!("[gpu] adapter: {}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("orbis-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .unwrap_or_else(|e| panic!("request device: {e}"));
        Self { instance, device, queue }
    }

    /// Blocking constructor for synchronous callers.
    #[must_use]
    pub fn new_blocking() -> Self {
        pollster::block_on(Self::new())
    }
}

/// Process-wide context so utilities and tests share one device.
static GPU_CTX: OnceLock<GpuContext> = OnceLock::new();

/// Persistent `GpuContext`, created on first use.
pub fn persistent() -> &'static GpuContext {
    GPU_CTX.get_or_init(GpuContext::new_blocking)
}
