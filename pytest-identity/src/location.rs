// Copyright (c) The pytest-identity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location URLs: the IDE-internal strings identifying a test's source
//! location relative to a root directory.

use crate::errors::LocationUrlError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use tracing::debug;

/// A parsed `python<ROOT_PATH>://dotted.qualified.name` location URL.
///
/// The `Display` impl re-serializes the exact wire format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLocationUrl {
    /// The absolute root path between the angle brackets.
    pub root: Utf8PathBuf,

    /// The dotted qualified name after `://`.
    pub qualified_name: String,
}

impl ParsedLocationUrl {
    /// Parses a location URL of the form `python<ROOT_PATH>://dotted.name`.
    pub fn parse(url: &str) -> Result<Self, LocationUrlError> {
        let rest = url
            .strip_prefix("python<")
            .ok_or_else(|| LocationUrlError::MissingPrefix {
                url: url.to_owned(),
            })?;
        let (root, rest) =
            rest.split_once('>')
                .ok_or_else(|| LocationUrlError::UnterminatedRoot {
                    url: url.to_owned(),
                })?;
        if root.is_empty() {
            return Err(LocationUrlError::EmptyRoot {
                url: url.to_owned(),
            });
        }
        let qualified_name =
            rest.strip_prefix("://")
                .ok_or_else(|| LocationUrlError::MissingSeparator {
                    url: url.to_owned(),
                })?;
        if qualified_name.is_empty() {
            return Err(LocationUrlError::EmptyPath {
                url: url.to_owned(),
            });
        }

        Ok(Self {
            root: root.into(),
            qualified_name: qualified_name.to_owned(),
        })
    }
}

impl fmt::Display for ParsedLocationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "python<{}>://{}", self.root, self.qualified_name)
    }
}

/// The candidate root directories a test runner might report locations
/// against.
#[derive(Clone, Debug, Default)]
pub struct ProjectRoots {
    /// The source root containing the test file, if one is configured.
    pub source_root: Option<Utf8PathBuf>,

    /// The content root containing the test file.
    pub content_root: Option<Utf8PathBuf>,

    /// The project base directory.
    pub project_root: Option<Utf8PathBuf>,
}

/// A host-adapter rendering of a test function's syntactic location.
#[derive(Clone, Debug)]
pub struct FunctionSite {
    /// Absolute path of the containing file.
    pub file: Utf8PathBuf,

    /// The function's own name.
    pub name: String,

    /// Enclosing class names, outermost first.
    pub class_chain: Vec<String>,

    /// The function's qualified name as reported by the host.
    pub qualified_name: String,
}

/// Generates the plausible location URLs a test runner might report for a
/// function.
///
/// Runners use different roots depending on project structure, so up to one
/// URL is produced per distinct root, in priority order: source root, then
/// content root, then project root. For content and project roots the
/// host-reported qualified name is also emitted when it differs from the
/// root-relative one, to match older reporting conventions. Callers must try
/// the URLs in order and accept the first match; duplicates are not filtered
/// here.
///
/// Returns an empty list when the function's name, qualified name, or file is
/// unknown.
pub fn candidate_urls(site: &FunctionSite, roots: &ProjectRoots) -> Vec<String> {
    if site.name.is_empty() || site.qualified_name.is_empty() || site.file.as_str().is_empty() {
        return Vec::new();
    }

    let mut urls = Vec::new();

    if let Some(source_root) = &roots.source_root {
        urls.push(format_url(source_root, &root_qualified_name(site, source_root)));
    }

    if let Some(content_root) = &roots.content_root
        && roots.source_root.as_deref() != Some(content_root.as_path())
    {
        push_with_psi_variant(&mut urls, site, content_root);
    }

    if let Some(project_root) = &roots.project_root
        && roots.source_root.as_deref() != Some(project_root.as_path())
        && roots.content_root.as_deref() != Some(project_root.as_path())
    {
        push_with_psi_variant(&mut urls, site, project_root);
    }

    debug!(function = %site.name, count = urls.len(), "generated candidate location URLs");
    urls
}

fn push_with_psi_variant(urls: &mut Vec<String>, site: &FunctionSite, root: &Utf8Path) {
    let url = format_url(root, &root_qualified_name(site, root));
    let psi_url = format_url(root, &site.qualified_name);
    let emit_psi = psi_url != url;
    urls.push(url);
    if emit_psi {
        urls.push(psi_url);
    }
}

/// Builds the dotted qualified name of `site` relative to `root`, e.g.
/// `unit/test_foo.py` under the root becomes `unit.test_foo.TestClass.test_bar`.
///
/// When a source root is configured, runners report module paths relative to
/// it without the root's own directory name, which this stripping reproduces.
/// A file outside the root falls back to the bare function name.
fn root_qualified_name(site: &FunctionSite, root: &Utf8Path) -> String {
    let Ok(relative) = site.file.strip_prefix(root) else {
        return site.name.clone();
    };

    let relative = relative.as_str();
    let module_path = relative
        .strip_suffix(".py")
        .unwrap_or(relative)
        .replace('/', ".");

    let mut parts = Vec::with_capacity(site.class_chain.len() + 2);
    parts.push(module_path);
    parts.extend(site.class_chain.iter().cloned());
    parts.push(site.name.clone());
    parts.join(".")
}

fn format_url(root: &Utf8Path, qualified_name: &str) -> String {
    format!("python<{root}>://{qualified_name}")
}
