//! Template reference engine.
//!
//! String values may embed `${#/json/pointer}` markers pointing at other
//! locations in the same document. This module finds those markers, proves
//! the reference graph acyclic, and splices resolved values back in place:
//!
//! 1. **scan** - marker discovery in single strings and whole documents
//! 2. **cycles** - cycle rejection over the owning-path adjacency
//! 3. **resolve** - transitive resolution and in-place text substitution

mod cycles;
mod models;
mod resolve;
mod scan;

pub use cycles::{check_cycles, ensure_acyclic};
pub use models::{PathWithReferences, Reference};
pub use resolve::{resolve_references, resolve_single_item};
pub use scan::{
    TEMPLATE_START, find_all_references, find_references_from_base, find_references_in_str,
};
