//! Scoped GPU -> CPU readback
//!
//! A staging buffer is mapped, exposed as a typed slice for the duration of a
//! closure, and unmapped again no matter how the closure exits.

use bytemuck::Pod;
use galaxy_physics::{SimError, SimResult};
use std::sync::mpsc;

/// Unmaps the buffer when dropped, whether or not the map completed.
struct MappedGuard<'a> {
    buffer: &'a wgpu::Buffer,
}

impl Drop for MappedGuard<'_> {
    fn drop(&mut self) {
        self.buffer.unmap();
    }
}

/// Map the first `size` bytes of `buffer` for reading and hand them to `read`
/// as `&[T]`.
///
/// Blocks until all previously submitted work touching `buffer` has finished,
/// so `read` never observes a partially written result. `buffer` must have
/// `MAP_READ` usage and must not be mapped already.
pub fn read_mapped<T, R>(
    device: &wgpu::Device,
    buffer: &wgpu::Buffer,
    size: wgpu::BufferAddress,
    read: impl FnOnce(&[T]) -> R,
) -> SimResult<R>
where
    T: Pod,
{
    let slice = buffer.slice(..size);

    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    // Unmapping also cancels a map that is still pending, so the buffer is
    // released on every exit below. Declared before the view so it drops after it.
    let _guard = MappedGuard { buffer };

    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .map_err(|err| SimError::Readback(format!("device poll failed: {err}")))?;

    match receiver.try_recv() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(SimError::Readback(format!("buffer map failed: {err}"))),
        Err(_) => {
            return Err(SimError::Readback(
                "buffer map did not complete after waiting on the device".into(),
            ))
        }
    }

    let view = slice.get_mapped_range();
    let bytes: &[u8] = &view;
    let values: &[T] = bytemuck::try_cast_slice(bytes).map_err(|err| {
        SimError::Readback(format!(
            "mapped range of {} bytes is not a whole number of {}-byte elements: {err}",
            bytes.len(),
            std::mem::size_of::<T>()
        ))
    })?;

    Ok(read(values))
}
