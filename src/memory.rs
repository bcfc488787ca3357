//! Heap accounting for throughput reports.
//!
//! Binaries install [`TrackingAllocator`] as the global allocator; the heap
//! counters stay at zero when it is not installed (e.g. under `cargo test`).
//! `sys_mb` comes from the OS via `sysinfo` and is always populated.

use serde::Serialize;
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};
use sysinfo::{ProcessExt, SystemExt};

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
static DEALLOCATED: AtomicUsize = AtomicUsize::new(0);
static FREES: AtomicUsize = AtomicUsize::new(0);

const MB: usize = 1024 * 1024;

/// System allocator wrapper that counts bytes in and out.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        DEALLOCATED.fetch_add(layout.size(), Ordering::Relaxed);
        FREES.fetch_add(1, Ordering::Relaxed);
    }
}

/// Heap figures in whole megabytes, plus the number of frees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    /// Bytes currently live.
    pub alloc_mb: usize,
    /// Bytes ever allocated.
    pub total_alloc_mb: usize,
    /// Resident memory of the process as reported by the OS.
    pub sys_mb: usize,
    pub frees: usize,
}

impl MemoryStats {
    pub fn snapshot() -> Self {
        let allocated = ALLOCATED.load(Ordering::Relaxed);
        let deallocated = DEALLOCATED.load(Ordering::Relaxed);
        Self::from_bytes(
            allocated.saturating_sub(deallocated),
            allocated,
            process_resident_bytes(),
            FREES.load(Ordering::Relaxed),
        )
    }

    fn from_bytes(live: usize, total: usize, resident: u64, frees: usize) -> Self {
        Self {
            alloc_mb: live / MB,
            total_alloc_mb: total / MB,
            sys_mb: (resident / MB as u64) as usize,
            frees,
        }
    }
}

/// Resident set size of this process; 0 when the platform cannot report it.
pub fn process_resident_bytes() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut system = sysinfo::System::new();
    if !system.refresh_process(pid) {
        return 0;
    }
    system.process(pid).map(|p| p.memory()).unwrap_or(0)
}
