// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage for observed test outcomes.

use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

/// The expected/actual pair recorded when a test fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDiff {
    /// The expected value from the failed assertion.
    pub expected: String,

    /// The actual value from the failed assertion.
    pub actual: String,

    /// The 1-based line the failure was reported on, if known.
    pub failed_line: Option<u32>,
}

/// A thread-safe map from test keys to their last-observed [`OutcomeDiff`].
///
/// The store is scoped to a single project session and owned by whatever
/// orchestrates the test-run lifecycle; on that lifecycle the owner calls
/// [`put`](Self::put) when a test fails, [`remove`](Self::remove) when the
/// test starts running again (so a re-run in progress never shows a stale
/// diff), and [`clear_all`](Self::clear_all) on session teardown.
///
/// Lookups may race with writers from a running test; a missed lookup is a
/// valid transient outcome, not an error.
#[derive(Debug, Default)]
pub struct OutcomeDiffStore {
    diffs: Mutex<HashMap<String, OutcomeDiff>>,
}

impl OutcomeDiffStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the diff observed for a test key, replacing any previous one.
    pub fn put(&self, key: impl Into<String>, diff: OutcomeDiff) {
        let key = key.into();
        debug!(key, "recording outcome diff");
        self.lock().insert(key, diff);
    }

    /// Removes and returns the diff for a key, if present.
    pub fn remove(&self, key: &str) -> Option<OutcomeDiff> {
        self.lock().remove(key)
    }

    /// Returns the diff stored for exactly this key.
    pub fn get(&self, key: &str) -> Option<OutcomeDiff> {
        self.lock().get(key).cloned()
    }

    /// Returns all currently stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Removes every stored diff.
    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Looks up a diff by an optional explicit key and an ordered list of
    /// candidate keys.
    ///
    /// The explicit key is tried first, exact only. Then each candidate in
    /// order is tried as an exact match, then as a prefix of the stored keys
    /// (`stored.starts_with(candidate)`), and the first hit wins — so callers
    /// must order candidates by priority. The prefix pass exists so a bare
    /// location URL matches its stored parametrized variants (`url[1]`); it
    /// will also conflate URLs that genuinely share a prefix, which callers
    /// accept as the price of parametrized lookup.
    ///
    /// Returns the matched diff together with the stored key it was found
    /// under.
    pub fn find_with_keys<S: AsRef<str>>(
        &self,
        candidates: &[S],
        explicit_key: Option<&str>,
    ) -> Option<(OutcomeDiff, String)> {
        let map = self.lock();

        if let Some(key) = explicit_key
            && let Some(diff) = map.get(key)
        {
            return Some((diff.clone(), key.to_owned()));
        }

        for candidate in candidates {
            let candidate = candidate.as_ref();
            if let Some(diff) = map.get(candidate) {
                return Some((diff.clone(), candidate.to_owned()));
            }
            if let Some((stored, diff)) = map
                .iter()
                .find(|(stored, _)| stored.starts_with(candidate))
            {
                return Some((diff.clone(), stored.clone()));
            }
        }

        None
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, OutcomeDiff>> {
        // A poisoned lock means some other thread panicked mid-operation;
        // the map itself is still a valid map, so keep serving it rather
        // than propagating the panic.
        self.diffs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
