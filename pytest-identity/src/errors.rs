// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors returned by pytest-identity.

use thiserror::Error;

/// An error that occurs while parsing a location URL.
///
/// The expected grammar is `python<ROOT_PATH>://dotted.qualified.name`, where
/// the angle brackets delimit an absolute root path and `://` separates the
/// protocol from the dotted path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LocationUrlError {
    /// The URL does not start with `python<`.
    #[error("location URL does not start with `python<`: {url}")]
    MissingPrefix {
        /// The input URL.
        url: String,
    },

    /// The root path is missing its closing `>`.
    #[error("location URL root path is not terminated by `>`: {url}")]
    UnterminatedRoot {
        /// The input URL.
        url: String,
    },

    /// The root path between the angle brackets is empty.
    #[error("location URL has an empty root path: {url}")]
    EmptyRoot {
        /// The input URL.
        url: String,
    },

    /// The `://` separator between protocol and dotted path is missing.
    #[error("location URL is missing the `://` separator: {url}")]
    MissingSeparator {
        /// The input URL.
        url: String,
    },

    /// The dotted path after `://` is empty.
    #[error("location URL has an empty dotted path: {url}")]
    EmptyPath {
        /// The input URL.
        url: String,
    },
}
