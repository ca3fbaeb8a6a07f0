/*++

Licensed under the Apache-2.0 license.

File Name:

    staging.rs

Abstract:

    File contains the request-scoped staging buffer used to shield the
    firmware boundary from caller-owned memory.

--*/

use alloc::alloc::{alloc_zeroed, dealloc};
use core::alloc::Layout;
use core::ptr::NonNull;
use core::slice;
use core::sync::atomic::{AtomicUsize, Ordering};

use aptee_api::{ApteeResult, EvidenceError};

static OUTSTANDING: AtomicUsize = AtomicUsize::new(0);
static TOTAL_CREATED: AtomicUsize = AtomicUsize::new(0);

/// Agent-owned memory holding one request's worth of data on its way to or
/// from the firmware boundary. Exactly `len` bytes, zero-initialized, never
/// reused across requests; the backing allocation is released on drop, which
/// covers every handler exit path.
pub struct StagingBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl StagingBuffer {
    /// Allocate a zeroed buffer of exactly `len` bytes.
    ///
    /// The length must already have been bounds-checked; this reports
    /// allocator failure as `OutOfMemory`. A zero-length buffer performs no
    /// raw allocation.
    pub fn zeroed(len: usize) -> ApteeResult<Self> {
        let ptr = if len == 0 {
            NonNull::dangling()
        } else {
            let layout =
                Layout::from_size_align(len, 1).map_err(|_| EvidenceError::OutOfMemory)?;
            // SAFETY: `layout` has non-zero size.
            let raw = unsafe { alloc_zeroed(layout) };
            NonNull::new(raw).ok_or(EvidenceError::OutOfMemory)?
        };
        OUTSTANDING.fetch_add(1, Ordering::Relaxed);
        TOTAL_CREATED.fetch_add(1, Ordering::Relaxed);
        Ok(Self { ptr, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr`/`len` describe this buffer's allocation for its
        // whole lifetime.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as `as_slice`, and `&mut self` gives unique access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Firmware-visible address of this buffer.
    pub fn device_addr(&self) -> u64 {
        self.ptr.as_ptr() as u64
    }

    /// Number of staging buffers currently alive across the agent.
    pub fn outstanding() -> usize {
        OUTSTANDING.load(Ordering::Relaxed)
    }

    /// Number of staging buffers ever created.
    pub fn total_created() -> usize {
        TOTAL_CREATED.load(Ordering::Relaxed)
    }
}

impl Drop for StagingBuffer {
    fn drop(&mut self) {
        OUTSTANDING.fetch_sub(1, Ordering::Relaxed);
        if self.len != 0 {
            // SAFETY: allocated in `zeroed` with this exact layout.
            unsafe {
                dealloc(
                    self.ptr.as_ptr(),
                    Layout::from_size_align_unchecked(self.len, 1),
                )
            };
        }
    }
}

/// Firmware-visible address of agent-owned bytes.
///
/// The agent's linear range is identity-mapped for the firmware boundary, so
/// the address of the bytes is the address the firmware is given. Used for
/// data embedded in the agent's copy of a request, such as the request
/// context.
pub fn shared_addr(bytes: &[u8]) -> u64 {
    bytes.as_ptr() as u64
}
