/*
 * ApkInspect v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Intent-filter queries over `<intent-filter>` manifest nodes.

use crate::{error::InspectError, manifest::ManifestNode};

pub const CATEGORY_BROWSABLE: &str = "android.intent.category.BROWSABLE";
const INTENT_PREFIX: &str = "android.intent.";
const ELEMENT_KINDS: [&str; 3] = ["action", "category", "data"];
const WEB_SCHEMES: [&str; 2] = ["http", "https"];

/// The `<intent-filter>` children of a component.
pub fn intent_filters(component: &ManifestNode) -> &[ManifestNode] {
    component.children("intent-filter")
}

/// Elements of `filter` named `name`.
///
/// # Arguments
/// * `kind` - `action`, `category` or `data`; inferred from names such as
///   `android.intent.category.BROWSABLE` when `None`
///
/// # Returns
/// * `Result<Vec<&ManifestNode>, InspectError>` - Matching elements, or an
///   error when the kind cannot be inferred
pub fn exist<'a>(
    filter: &'a ManifestNode,
    name: &str,
    kind: Option<&str>,
) -> Result<Vec<&'a ManifestNode>, InspectError> {
    let kind = match kind {
        Some(kind) => kind,
        None => name
            .strip_prefix(INTENT_PREFIX)
            .and_then(|rest| rest.split('.').next())
            .filter(|kind| ELEMENT_KINDS.contains(kind))
            .ok_or_else(|| InspectError::UnknownIntentElement(name.to_string()))?,
    };
    Ok(filter
        .children(kind)
        .iter()
        .filter(|el| el.string("name").as_deref() == Some(name))
        .collect())
}

pub fn is_browsable(filter: &ManifestNode) -> bool {
    exist(filter, CATEGORY_BROWSABLE, None).is_ok_and(|found| !found.is_empty())
}

fn data(filter: &ManifestNode) -> &[ManifestNode] {
    filter.children("data")
}

fn is_web_scheme(scheme: &str) -> bool {
    WEB_SCHEMES.contains(&scheme)
}

pub fn has_deep_links(filter: &ManifestNode) -> bool {
    is_browsable(filter)
        && data(filter)
            .iter()
            .any(|d| d.string("scheme").is_some_and(|s| is_web_scheme(&s)))
}

/// Hosts declared by a browsable http(s) filter, de-duplicated in order.
pub fn deep_links(filter: &ManifestNode) -> Vec<String> {
    if !has_deep_links(filter) {
        return Vec::new();
    }
    unique(data(filter).iter().filter_map(|d| d.string("host")))
}

pub fn has_schemes(filter: &ManifestNode) -> bool {
    is_browsable(filter)
        && data(filter)
            .iter()
            .any(|d| d.string("scheme").is_some_and(|s| !is_web_scheme(&s)))
}

/// Non-web schemes declared by a browsable filter, de-duplicated in order.
pub fn schemes(filter: &ManifestNode) -> Vec<String> {
    if !has_schemes(filter) {
        return Vec::new();
    }
    unique(
        data(filter)
            .iter()
            .filter_map(|d| d.string("scheme"))
            .filter(|s| !is_web_scheme(s)),
    )
}

fn unique(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
