//! Render Loop
//!
//! Binds observable application data to a render function and the
//! reconciler.
//!
//! # Pipeline Architecture
//!
//! ```text
//! property write → Dep::notify → render Computation → render fn → VNode
//!                                                                   │
//!                     host mutations ◀── mount / patch(baseline, next)
//! ```
//!
//! ## Data Flow
//!
//! 1. **observe** - Mount data becomes a [`ReactiveObject`](crate::reactive::ReactiveObject)
//! 2. **render computation** - Calls the render function with a top-level
//!    proxy; every read subscribes the computation
//! 3. **reconcile** - The first pass mounts onto the anchor, later passes
//!    patch against the retained baseline tree
//!
//! Everything runs synchronously inside the writer's call stack.

pub mod mount;

pub use mount::{App, MountOptions, RenderFn};
