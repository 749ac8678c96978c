//! Per-thread scratch storage reserved at `attach` time.
//!
//! The engine needs a few symbol-sized XOR accumulators per in-flight call
//! (row/diagonal/anti-diagonal for the encoder and checker, the lazy
//! checksums for the updater). Rather than allocate on every call, `attach`
//! reserves `3 * symbol_size * concurrent_threads` bytes up front and hands
//! out disjoint slots by `ThreadID`. The pool itself is `Mutex`-guarded
//! (mirroring the teacher's `DmaBufPool`) because the borrow checker cannot
//! express "callers always pass disjoint `ThreadID`s" without either
//! `unsafe` or a lock; the lock is uncontended in practice since the
//! critical section is only the slot carve-out, not the XOR work itself.

use parking_lot::Mutex;

use crate::buffer::AlignedBuffer;
use crate::error::{Result, RtpError};

/// Three symbol-sized scratch buffers reserved for one thread's in-flight
/// call.
pub struct ScratchSlot {
    pub a: AlignedBuffer,
    pub b: AlignedBuffer,
    pub c: AlignedBuffer,
}

struct Inner {
    slots: Vec<Option<ScratchSlot>>,
}

/// A pool of per-thread scratch slots, sized at `attach` time.
pub struct ScratchPool {
    inner: Mutex<Inner>,
    symbol_size: usize,
    concurrent_threads: usize,
}

impl ScratchPool {
    /// Reserve `concurrent_threads` slots, each with three `symbol_size`-byte
    /// aligned buffers (`3 * symbol_size * concurrent_threads` bytes total).
    pub fn new(symbol_size: usize, concurrent_threads: usize) -> Result<Self> {
        let mut slots = Vec::with_capacity(concurrent_threads);
        for _ in 0..concurrent_threads {
            slots.push(Some(ScratchSlot {
                a: AlignedBuffer::new_zeroed(symbol_size)?,
                b: AlignedBuffer::new_zeroed(symbol_size)?,
                c: AlignedBuffer::new_zeroed(symbol_size)?,
            }));
        }
        Ok(Self {
            inner: Mutex::new(Inner { slots }),
            symbol_size,
            concurrent_threads,
        })
    }

    /// Check out the slot reserved for `thread_id`, leaving a `None` in its
    /// place so a second concurrent checkout for the same id is caught
    /// rather than silently aliased.
    pub fn checkout(&self, thread_id: usize) -> Result<ScratchSlot> {
        let mut inner = self.inner.lock();
        let slot = inner
            .slots
            .get_mut(thread_id)
            .ok_or(RtpError::IndexOutOfRange {
                what: "thread_id",
                value: thread_id,
                bound: self.concurrent_threads,
            })?;
        slot.take().ok_or(RtpError::IndexOutOfRange {
            what: "thread_id (already checked out)",
            value: thread_id,
            bound: self.concurrent_threads,
        })
    }

    /// Return a slot checked out via [`ScratchPool::checkout`].
    pub fn checkin(&self, thread_id: usize, mut slot: ScratchSlot) {
        slot.a.zero();
        slot.b.zero();
        slot.c.zero();
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.slots.get_mut(thread_id) {
            *entry = Some(slot);
        }
    }

    /// Check out `thread_id`'s slot behind an RAII guard that checks it back
    /// in on drop, including on an early return via `?` — callers never have
    /// to remember to call `checkin` on every path out of a function.
    pub fn acquire(&self, thread_id: usize) -> Result<CheckedOutScratch<'_>> {
        let slot = self.checkout(thread_id)?;
        Ok(CheckedOutScratch {
            pool: self,
            thread_id,
            slot: Some(slot),
        })
    }

    pub fn symbol_size(&self) -> usize {
        self.symbol_size
    }

    pub fn concurrent_threads(&self) -> usize {
        self.concurrent_threads
    }
}

/// A [`ScratchSlot`] checked out for the duration of one call. Checks the
/// slot back in to its pool when dropped.
pub struct CheckedOutScratch<'a> {
    pool: &'a ScratchPool,
    thread_id: usize,
    slot: Option<ScratchSlot>,
}

impl CheckedOutScratch<'_> {
    /// Borrow the three scratch buffers for this call.
    pub fn slot_mut(&mut self) -> &mut ScratchSlot {
        self.slot
            .as_mut()
            .expect("slot is only taken by Drop, which runs once at end of scope")
    }
}

impl Drop for CheckedOutScratch<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.pool.checkin(self.thread_id, slot);
        }
    }
}
