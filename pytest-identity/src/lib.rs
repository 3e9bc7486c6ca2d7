// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of pytest test identities across IDE test-tree reports.
//!
//! Test runners and IDEs describe the same test in several, mutually
//! inconsistent ways: a location URL (`python<root>://dotted.name`), a
//! test-tree proxy chain, a qualified name, and pytest's own node id
//! (`path/to/file.py::Class::test[param]`). This crate rebuilds canonical
//! node ids from that partially-unreliable data, extracts the failing line
//! from pytest tracebacks, and correlates recorded test outcomes back to
//! source functions.
//!
//! All lookups are best-effort: a value that cannot be derived is reported
//! as `None` or an empty list, never as a panic. The only fallible parse
//! with a structured error is the location URL grammar, in [`errors`].

pub mod errors;
mod location;
mod node_id;
mod store;
mod test_key;
mod trace;

pub use location::{FunctionSite, ParsedLocationUrl, ProjectRoots, candidate_urls};
pub use node_id::{
    Scope, ScopeKind, TestRecord, build_node_id, collect_proxy_path, node_id_from_proxy_path,
    node_id_from_scopes,
};
pub use store::{OutcomeDiff, OutcomeDiffStore};
pub use test_key::{normalize_param_suffix, test_key};
pub use trace::failed_line;
