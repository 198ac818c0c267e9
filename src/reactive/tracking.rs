//! Tracking Stack - Which computation is currently reading.
//!
//! Every computation run pushes a frame onto a thread-local stack and pops it
//! when the run ends. Reads performed by observable properties land in the
//! top frame's read set; the owning computation flushes that set into the
//! dependency graph after the run.
//!
//! A computation created or triggered from inside another computation's run
//! pops back to the outer frame when it finishes, and the outer run keeps
//! collecting its own reads.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use super::dep::{DepId, DepInner};

/// Reads collected by one frame, keyed by dependency id.
pub(crate) type ReadSet = IndexMap<DepId, Rc<DepInner>>;

struct Frame {
    /// Untracked frames swallow reads instead of recording them.
    tracked: bool,
    reads: ReadSet,
}

// =============================================================================
// Tracking State
// =============================================================================

thread_local! {
    /// Stack of active tracking frames (innermost last).
    static TRACKING_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };

    /// Counter for dependency and computation ids.
    static ID_COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Allocate a fresh id for a dependency or computation.
pub(crate) fn next_id() -> u64 {
    ID_COUNTER.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        id
    })
}

// =============================================================================
// Frames
// =============================================================================

fn push_frame(tracked: bool) {
    TRACKING_STACK.with(|stack| {
        stack.borrow_mut().push(Frame {
            tracked,
            reads: IndexMap::new(),
        });
    })
}

fn pop_frame() -> Option<Frame> {
    TRACKING_STACK.with(|stack| stack.borrow_mut().pop())
}

/// Record a read of `dep` in the innermost frame, if it is tracked.
pub(crate) fn record_read(dep: &Rc<DepInner>) {
    TRACKING_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if let Some(frame) = stack.last_mut() {
            if frame.tracked {
                frame.reads.entry(dep.id).or_insert_with(|| Rc::clone(dep));
            }
        }
    })
}

/// Whether a read right now would be recorded by some computation.
pub fn is_tracking() -> bool {
    TRACKING_STACK.with(|stack| stack.borrow().last().is_some_and(|frame| frame.tracked))
}

/// Number of frames currently on the stack.
pub fn tracking_depth() -> usize {
    TRACKING_STACK.with(|stack| stack.borrow().len())
}

/// Run `f` without recording any of its reads.
///
/// Reads made inside `f` do not subscribe the surrounding computation.
pub fn untracked<T>(f: impl FnOnce() -> T) -> T {
    let _guard = FrameGuard::enter(false);
    f()
}

/// Pops the frame it pushed, also when the body unwinds.
pub(crate) struct FrameGuard {
    active: bool,
}

impl FrameGuard {
    pub(crate) fn enter(tracked: bool) -> Self {
        push_frame(tracked);
        Self { active: true }
    }

    /// Pop the frame and hand back everything it read.
    pub(crate) fn finish(mut self) -> ReadSet {
        self.active = false;
        pop_frame().map(|frame| frame.reads).unwrap_or_default()
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.active {
            pop_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Dep;

    #[test]
    fn test_no_frame_means_no_tracking() {
        assert!(!is_tracking());
        assert_eq!(tracking_depth(), 0);
    }

    #[test]
    fn test_frames_nest_and_restore() {
        let outer = FrameGuard::enter(true);
        assert!(is_tracking());

        let inner = FrameGuard::enter(false);
        assert!(!is_tracking());
        assert_eq!(tracking_depth(), 2);
        drop(inner);

        assert!(is_tracking());
        let reads = outer.finish();
        assert!(reads.is_empty());
        assert_eq!(tracking_depth(), 0);
    }

    #[test]
    fn test_reads_land_in_innermost_tracked_frame() {
        let a = Dep::new("a");
        let b = Dep::new("b");

        let outer = FrameGuard::enter(true);
        a.depend();
        let inner = FrameGuard::enter(true);
        b.depend();
        let inner_reads = inner.finish();
        a.depend();
        let outer_reads = outer.finish();

        assert_eq!(inner_reads.len(), 1);
        assert!(inner_reads.contains_key(&b.id()));
        assert_eq!(outer_reads.len(), 1);
        assert!(outer_reads.contains_key(&a.id()));
    }

    #[test]
    fn test_untracked_swallows_reads() {
        let a = Dep::new("a");
        let frame = FrameGuard::enter(true);
        untracked(|| a.depend());
        assert!(frame.finish().is_empty());
    }

    #[test]
    fn test_guard_pops_on_unwind() {
        let result = std::panic::catch_unwind(|| {
            let _guard = FrameGuard::enter(true);
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(tracking_depth(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = next_id();
        let b = next_id();
        assert_ne!(a, b);
    }
}
