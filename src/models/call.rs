//! Call template model.
//!
//! Call templates are stored per workspace as a YAML mapping of call name to
//! template. Field names follow the persisted camelCase schema; unknown
//! fields are ignored so documents stay forward-compatible.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// HTTP verbs supported by call templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether the verb carries a request body. GET never does.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Get
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an extraction rule reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractSource {
    Header,
    JsonBody,
}

impl Default for ExtractSource {
    fn default() -> Self {
        ExtractSource::JsonBody
    }
}

/// A single response-extraction rule.
///
/// Rules run in declared order after a call completes; each writes one
/// variable into the workspace's extracted map. `value` is a header name
/// for HEADER rules and a single-value JSON path (`$.a.b[0]`) for
/// JSON_BODY rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractRule {
    #[serde(default)]
    pub from: ExtractSource,

    /// Target variable name.
    #[serde(default)]
    pub to: String,

    /// Selector: header name or JSON path.
    #[serde(default)]
    pub value: String,
}

/// One file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartFilePart {
    /// Path relative to the workspace's `bodies/` directory.
    pub path: String,

    /// Multipart form-data field name.
    pub name: String,

    /// Form-data filename; defaults to the file's own name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// If true, the file is read as UTF-8 text and variables are
    /// substituted; otherwise it is attached as opaque bytes.
    #[serde(default)]
    pub substitute_vars: bool,

    /// Part content type; probed from the file path when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// A stored, reusable, parameterized HTTP request definition.
///
/// At most one body source is active per call, chosen by fixed precedence:
/// multipart files, then form fields, then an external body file supplied
/// at call time, then the inline `body` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTemplate {
    /// Request URL; may contain `{var}` placeholders.
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub method: HttpMethod,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Request headers in document order; values may contain placeholders.
    #[serde(
        default,
        deserialize_with = "ordered_entries",
        serialize_with = "entries_as_map",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub headers: Vec<(String, String)>,

    /// Inline request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// If true, substitute variables in the request body, whether inline
    /// or read from a body file passed on the command line. A body file
    /// is read as UTF-8 when substituting.
    #[serde(default = "default_true")]
    pub body_substitute_vars: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracts: Vec<ExtractRule>,

    /// If non-empty, send as multipart. `contentType` must be
    /// `multipart/*`, e.g. `multipart/form-data`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multipart_files: Vec<MultipartFilePart>,

    /// If non-empty, send as `application/x-www-form-urlencoded`.
    #[serde(
        default,
        deserialize_with = "ordered_entries",
        serialize_with = "entries_as_map",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub form: Vec<(String, String)>,
}

impl Default for CallTemplate {
    fn default() -> Self {
        CallTemplate {
            url: String::new(),
            method: HttpMethod::default(),
            content_type: default_content_type(),
            headers: Vec::new(),
            body: None,
            body_substitute_vars: default_true(),
            extracts: Vec::new(),
            multipart_files: Vec::new(),
            form: Vec::new(),
        }
    }
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_true() -> bool {
    true
}

/// The calls document of a workspace: call templates keyed by name, in
/// document order. Listing follows the order calls appear in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallSet {
    entries: Vec<(String, CallTemplate)>,
}

impl CallSet {
    pub fn new() -> Self {
        CallSet::default()
    }

    pub fn get(&self, name: &str) -> Option<&CallTemplate> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, template)| template)
    }

    pub fn insert(&mut self, name: impl Into<String>, template: CallTemplate) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = template;
        } else {
            self.entries.push((name, template));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CallTemplate)> {
        self.entries
            .iter()
            .map(|(name, template)| (name.as_str(), template))
    }

    pub fn templates(&self) -> impl Iterator<Item = &CallTemplate> {
        self.entries.iter().map(|(_, template)| template)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for CallSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        entries_as_map(&self.entries, serializer)
    }
}

impl<'de> Deserialize<'de> for CallSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(CallSet {
            entries: ordered_entries(deserializer)?,
        })
    }
}

/// Deserializes a YAML mapping into a vector of pairs, preserving document
/// order. An absent or null value yields an empty vector.
pub(crate) fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V> Visitor<'de> for EntriesVisitor<V>
    where
        V: Deserialize<'de>,
    {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping with string keys")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, value)) = access.next_entry()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(EntriesVisitor(PhantomData))
}

pub(crate) fn entries_as_map<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
