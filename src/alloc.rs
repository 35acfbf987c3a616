//! Heap allocation tracking.
//!
//! Install [`TrackingAllocator`] as the process-wide allocator to capture the
//! bytes and allocation count of each measured call:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: format_bench::alloc::TrackingAllocator = format_bench::alloc::TrackingAllocator;
//! ```
//!
//! Counters are per thread, so formats measured concurrently in parallel mode
//! do not see each other's allocations.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static BYTES: Cell<u64> = const { Cell::new(0) };
    static COUNT: Cell<u64> = const { Cell::new(0) };
}

/// Counting wrapper around the system allocator.
pub struct TrackingAllocator;

#[inline]
fn record(size: usize) {
    // try_with: the thread-local may already be torn down during thread exit.
    let _ = BYTES.try_with(|b| b.set(b.get().wrapping_add(size as u64)));
    let _ = COUNT.try_with(|c| c.set(c.get().wrapping_add(1)));
}

#[inline]
fn mark_installed() {
    if !INSTALLED.load(Ordering::Relaxed) {
        INSTALLED.store(true, Ordering::Relaxed);
    }
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        mark_installed();
        record(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        mark_installed();
        record(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // Only growth counts as an allocation.
        if new_size > layout.size() {
            record(new_size - layout.size());
        }
        System.realloc(ptr, layout, new_size)
    }
}

/// Zero the calling thread's counters.
pub fn reset_allocation_counter() {
    BYTES.with(|b| b.set(0));
    COUNT.with(|c| c.set(0));
}

/// `(bytes, count)` allocated on the calling thread since the last reset.
pub fn current_allocation() -> (u64, u64) {
    (BYTES.with(Cell::get), COUNT.with(Cell::get))
}

/// Whether [`TrackingAllocator`] is serving this process.
pub fn is_tracking() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_reset_to_zero() {
        record(128);
        reset_allocation_counter();
        assert_eq!(current_allocation(), (0, 0));
    }

    #[test]
    fn record_accumulates_on_this_thread_only() {
        reset_allocation_counter();
        record(100);
        record(28);
        let other = std::thread::spawn(current_allocation).join().unwrap();
        assert_eq!(current_allocation(), (128, 2));
        assert_eq!(other, (0, 0));
    }

    #[test]
    fn zeroed_alloc_marks_installed_and_shrink_is_not_counted() {
        let a = TrackingAllocator;
        let big = Layout::from_size_align(64, 8).unwrap();
        let small = Layout::from_size_align(16, 8).unwrap();
        unsafe {
            let p = a.alloc_zeroed(big);
            assert!(!p.is_null());
            assert!(is_tracking());

            reset_allocation_counter();
            let p = a.realloc(p, big, 16);
            assert_eq!(current_allocation(), (0, 0));

            let p = a.realloc(p, small, 48);
            assert_eq!(current_allocation(), (32, 1));
            a.dealloc(p, Layout::from_size_align(48, 8).unwrap());
        }
    }
}
