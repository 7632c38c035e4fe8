//! Incremental work-loop tree renderer.
//!
//! Callers describe a tree of typed elements; the engine mirrors it in a
//! work-unit arena, expands function components lazily, materializes host
//! nodes for the leaves and commits the finished tree onto a render target
//! in one pass:
//!
//! ```text
//! Element tree → WorkTree (begin/complete per idle slot) → commit → HostTree
//! ```
//!
//! Every render rebuilds the work tree from scratch and only ever appends
//! to the host tree; there is no diffing against a previous cycle. The
//! render target and the idle-time source stay behind the [`HostTree`] and
//! [`IdleScheduler`] traits; `weft-runtime-std` provides `std`-backed
//! implementations.

pub mod collections;
mod element;
mod host;
mod platform;
mod renderer;
mod work;

pub use element::{
    component, create_element, Child, Children, ComponentFn, Element, ElementType, EventHandler,
    PropValue, Props, Scalar, StyleMap,
};
pub use host::{HostError, HostTree, MemoryHost, MemoryNode, NodeId};
pub use platform::{Clock, Deadline, IdleScheduler, NoopScheduler, RunToCompletion, UnitBudget};
pub use renderer::{PassOutcome, Renderer};
