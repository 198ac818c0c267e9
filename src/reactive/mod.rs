//! Reactivity Engine - Observable data graph and dependency tracking.
//!
//! # Architecture
//!
//! ```text
//! plain data ──observe()──▶ Value graph (ReactiveObject / ReactiveArray)
//!                               │ get: Dep::depend() → top tracking frame
//!                               │ set: identity check → Dep::notify()
//!                               ▼
//!                          Computation::run() → re-reads → new read set
//! ```
//!
//! - [`observe`] turns plain `serde_json` data into a graph in which every
//!   object property and every array is observable.
//! - Each property owns a [`Dep`]: the set of [`Computation`]s whose latest
//!   run read it.
//! - A computation collects its reads on a thread-local tracking stack and
//!   re-subscribes at the end of every run, dropping dependencies it no longer
//!   reads.
//! - Writes notify synchronously; there is no batching or scheduling.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`, thread-local stack).

mod array;
mod computation;
mod dep;
mod object;
mod proxy;
mod tracking;
mod value;

pub use array::ReactiveArray;
pub use computation::{Computation, ComputationId};
pub use dep::{Dep, DepId};
pub use object::ReactiveObject;
pub use proxy::{Proxy, proxy_top_level};
pub use tracking::{is_tracking, tracking_depth, untracked};
pub use value::{Value, observe};
