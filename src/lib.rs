//! # spark-vdom
//!
//! Minimal reactive UI runtime: fine-grained dependency tracking over a nested
//! data graph, plus a virtual-tree reconciler that turns successive renders
//! into minimal host-tree mutations.
//!
//! ## Architecture
//!
//! ```text
//! serde_json data ──observe──▶ ReactiveObject ──reads──▶ render Computation
//!        ▲                                                      │
//!   App::set / writes                                   render fn → VNode
//!                                                               │
//!                        HostTree ◀── mount / patch(baseline, next)
//! ```
//!
//! The host tree is an abstract capability ([`HostTree`]); [`MemoryHost`] is
//! an arena implementation with a mutation log.
//!
//! ## Modules
//!
//! - [`reactive`] - Observable values, dependency sets, computations
//! - [`vdom`] - Virtual nodes and the `create_element` helper
//! - [`host`] - Host tree capability and the in-memory host
//! - [`renderer`] - Initial mount and differential patching
//! - [`pipeline`] - Mount options and the [`App`] render loop
//! - [`types`] - Shared handles, attribute maps and patch flags

pub mod error;
pub mod host;
pub mod pipeline;
pub mod reactive;
pub mod renderer;
pub mod types;
pub mod vdom;

pub use error::{Error, Result};

pub use types::{Attrs, NodeId, PatchFlags, attrs};

pub use reactive::{
    Computation, ComputationId, Dep, DepId, Proxy, ReactiveArray, ReactiveObject, Value,
    is_tracking, observe, proxy_top_level, untracked,
};

pub use vdom::{Child, Children, CreateElement, VNode, create_element, h};

pub use host::{HostTree, MemoryHost, Mutation};

pub use renderer::{
    PatchReport, ReconcileConfig, TagChangePolicy, create_elm, mount, patch, patch_with,
};

pub use pipeline::{App, MountOptions, RenderFn};
