//! Variable scope merging and placeholder substitution.
//!
//! A call's variable scope is the union of the selected persisted variable
//! set and the workspace's extracted variables; extracted values win for
//! names present in both. Substitution replaces `{name}` tokens against the
//! merged scope in a single pass. Unknown names are left verbatim, so
//! partially-parameterized templates stay inspectable before every variable
//! is populated.

use crate::models::CallSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Cached pattern matching a single `{name}` placeholder. Names cannot
/// contain braces, which keeps JSON bodies like `{"k":"{v}"}` intact: only
/// the inner `{v}` token matches.
static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("invalid placeholder regex"));

/// Merges persisted and extracted variables into a single scope.
/// For names present in both maps, the extracted value wins.
pub fn merged_scope(
    persisted: &BTreeMap<String, String>,
    extracted: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = persisted.clone();
    for (name, value) in extracted {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Replaces every `{name}` token whose name exists in `vars` with its
/// value. Tokens with no matching name are left unchanged, and no error is
/// raised for them.
pub fn substitute(template: &str, vars: &BTreeMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Substitutes every header value against `vars`, preserving order.
pub fn substitute_pairs(
    pairs: &[(String, String)],
    vars: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| (name.clone(), substitute(value, vars)))
        .collect()
}

/// All placeholder names found in a template string.
pub fn placeholder_names(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Placeholder names a workspace's calls rely on from the variable set:
/// every name referenced by URLs, inline bodies, and header values, minus
/// the names produced by extraction rules. Used to seed and update
/// variable-set files.
pub fn variables_used_in_calls(calls: &CallSet) -> BTreeSet<String> {
    let targets = extraction_targets(calls);
    let mut used = BTreeSet::new();
    for template in calls.templates() {
        used.extend(placeholder_names(&template.url));
        if let Some(body) = &template.body {
            used.extend(placeholder_names(body));
        }
        for (_, value) in &template.headers {
            used.extend(placeholder_names(value));
        }
    }
    used.retain(|name| !targets.contains(name));
    used
}

/// Names written by extraction rules across all calls of a workspace.
pub fn extraction_targets(calls: &CallSet) -> BTreeSet<String> {
    calls
        .templates()
        .flat_map(|template| template.extracts.iter())
        .map(|rule| rule.to.clone())
        .collect()
}
