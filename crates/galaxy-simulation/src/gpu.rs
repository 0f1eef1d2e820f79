//! Headless wgpu device acquisition for the compute backend

use galaxy_physics::{SimError, SimResult};

/// A device/queue pair from an adapter that can run compute shaders.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Request a high-performance adapter with no surface attached.
    ///
    /// Fails with `BackendUnavailable` when there is no adapter or it lacks
    /// compute-shader support.
    pub async fn request() -> SimResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|err| SimError::BackendUnavailable(format!("no GPU adapter found: {err}")))?;

        let adapter_info = adapter.get_info();
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            return Err(SimError::BackendUnavailable(format!(
                "adapter `{}` ({:?}) does not support compute shaders",
                adapter_info.name, adapter_info.backend
            )));
        }

        log::info!(
            "✓ Using GPU: {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Galaxy Compute Device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|err| {
                SimError::BackendUnavailable(format!(
                    "adapter `{}` refused a device: {err}",
                    adapter_info.name
                ))
            })?;

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }
}
