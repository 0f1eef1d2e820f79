//! GPU compute backend (wgpu)
//!
//! Buffers are double: the shader reads `*_in` and writes `*_out`. The host
//! state is uploaded into `*_in` at the start of every tick and `*_out` is
//! copied into a staging buffer and read back at the end, so the host store
//! stays authoritative and either backend can run any tick.

use super::readback::read_mapped;
use super::{check_len, Backend, BackendKind};
use crate::gpu::GpuContext;
use crate::params::{GpuParams, GpuVec3};
use crate::state::ParticleState;
use galaxy_physics::{PhysicsParams, SimError, SimResult};
use glam::Vec3;

const WORKGROUP_SIZE: u32 = 256;

/// All N pairwise sums computed concurrently, one invocation per star.
pub struct BulkParallelBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    name: String,

    // Buffers
    params_buffer: wgpu::Buffer,
    positions_in: wgpu::Buffer,
    velocities_in: wgpu::Buffer,
    positions_out: wgpu::Buffer,
    velocities_out: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,

    // Compute pipeline
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,

    particle_count: u32,
    array_size: wgpu::BufferAddress,

    // Host-side packing scratch (vec3 -> vec4 stride)
    upload: Vec<GpuVec3>,
}

impl BulkParallelBackend {
    pub async fn new(context: GpuContext, particle_count: usize) -> SimResult<Self> {
        log::info!("Initializing bulk-parallel backend...");
        let GpuContext {
            device,
            queue,
            adapter_info,
        } = context;

        let (count, array_size) = check_limits(&device, particle_count)?;

        // Buffer creation can run out of device memory; report that instead of
        // letting the uncaptured-error handler abort the process.
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Physics Params Buffer"),
            size: std::mem::size_of::<GpuParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let storage = |label: &'static str, usage: wgpu::BufferUsages| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: array_size,
                usage: wgpu::BufferUsages::STORAGE | usage,
                mapped_at_creation: false,
            })
        };
        let positions_in = storage("Position Input Buffer", wgpu::BufferUsages::COPY_DST);
        let velocities_in = storage("Velocity Input Buffer", wgpu::BufferUsages::COPY_DST);
        let positions_out = storage("Position Output Buffer", wgpu::BufferUsages::COPY_SRC);
        let velocities_out = storage("Velocity Output Buffer", wgpu::BufferUsages::COPY_SRC);

        // Positions then velocities, back to back
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging Buffer"),
            size: array_size * 2,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(SimError::Allocation {
                what: "GPU buffers",
                count: particle_count,
                reason: err.to_string(),
            });
        }
        log::debug!("Buffers created ({array_size} bytes per array)");

        // Shader and pipeline problems are validation errors
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("N-body Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/nbody.wgsl").into()),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("N-body Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1, true),
                storage_entry(2, true),
                storage_entry(3, false),
                storage_entry(4, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("N-body Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("N-body Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("N-body Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: positions_in.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: velocities_in.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: positions_out.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: velocities_out.as_entire_binding(),
                },
            ],
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(SimError::BackendUnavailable(format!(
                "compute pipeline rejected by `{}`: {err}",
                adapter_info.name
            )));
        }
        log::info!("✓ Bulk-parallel backend ready ({particle_count} particles)");

        Ok(Self {
            device,
            queue,
            name: format!("wgpu ({:?}: {})", adapter_info.backend, adapter_info.name),
            params_buffer,
            positions_in,
            velocities_in,
            positions_out,
            velocities_out,
            staging_buffer,
            pipeline,
            bind_group,
            particle_count: count,
            array_size,
            upload: vec![GpuVec3::default(); particle_count],
        })
    }

    fn workgroup_count(&self) -> u32 {
        self.particle_count.div_ceil(WORKGROUP_SIZE)
    }
}

/// Pack `values` into vec4 stride and queue the write into `buffer`.
fn write_vectors(
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    scratch: &mut [GpuVec3],
    values: &[Vec3],
) {
    for (slot, value) in scratch.iter_mut().zip(values) {
        *slot = GpuVec3::from(*value);
    }
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(scratch));
}

/// Reject particle counts the device cannot hold or dispatch.
fn check_limits(device: &wgpu::Device, particle_count: usize) -> SimResult<(u32, u64)> {
    let allocation_error = |reason: String| SimError::Allocation {
        what: "GPU buffers",
        count: particle_count,
        reason,
    };

    let count = u32::try_from(particle_count)
        .map_err(|_| allocation_error("particle count exceeds u32 indexing".into()))?;
    let array_size = particle_count as u64 * std::mem::size_of::<GpuVec3>() as u64;

    let limits = device.limits();
    let max_binding = limits.max_storage_buffer_binding_size as u64;
    if array_size > max_binding {
        return Err(allocation_error(format!(
            "{array_size} byte arrays exceed the storage binding limit of {max_binding} bytes"
        )));
    }
    if array_size * 2 > limits.max_buffer_size {
        return Err(allocation_error(format!(
            "{} byte staging buffer exceeds the buffer size limit of {} bytes",
            array_size * 2,
            limits.max_buffer_size
        )));
    }
    let workgroups = count.div_ceil(WORKGROUP_SIZE);
    if workgroups > limits.max_compute_workgroups_per_dimension {
        return Err(allocation_error(format!(
            "{workgroups} workgroups exceed the dispatch limit of {}",
            limits.max_compute_workgroups_per_dimension
        )));
    }

    Ok((count, array_size))
}

impl Backend for BulkParallelBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::BulkParallel
    }

    fn particle_count(&self) -> usize {
        self.particle_count as usize
    }

    fn step(&mut self, state: &mut ParticleState, params: &PhysicsParams) -> SimResult<()> {
        check_len(self.particle_count as usize, state)?;

        // Latest parameters, every tick
        let gpu_params = GpuParams::new(params, self.particle_count);
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[gpu_params]));
        write_vectors(
            &self.queue,
            &self.positions_in,
            &mut self.upload,
            state.positions(),
        );
        write_vectors(
            &self.queue,
            &self.velocities_in,
            &mut self.upload,
            state.velocities(),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("N-body Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("N-body Compute Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &self.bind_group, &[]);
            compute_pass.dispatch_workgroups(self.workgroup_count(), 1, 1);
        }

        // Copies are ordered after the pass, so they see every invocation's writes
        encoder.copy_buffer_to_buffer(
            &self.positions_out,
            0,
            &self.staging_buffer,
            0,
            self.array_size,
        );
        encoder.copy_buffer_to_buffer(
            &self.velocities_out,
            0,
            &self.staging_buffer,
            self.array_size,
            self.array_size,
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let count = self.particle_count as usize;
        let (positions, velocities) = state.arrays_mut();
        read_mapped::<GpuVec3, _>(
            &self.device,
            &self.staging_buffer,
            self.array_size * 2,
            |data| {
                if data.len() != count * 2 {
                    return Err(SimError::Readback(format!(
                        "expected {} vectors from the device, got {}",
                        count * 2,
                        data.len()
                    )));
                }
                let (new_positions, new_velocities) = data.split_at(count);
                for (dst, src) in positions.iter_mut().zip(new_positions) {
                    *dst = Vec3::from(*src);
                }
                for (dst, src) in velocities.iter_mut().zip(new_velocities) {
                    *dst = Vec3::from(*src);
                }
                Ok(())
            },
        )?
    }
}
