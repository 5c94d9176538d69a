//! Request payload construction.
//!
//! A call template can configure several body sources at once; exactly one
//! becomes the payload, picked by fixed precedence: multipart files, then
//! form fields, then an external body file named on the command line, then
//! the inline body string. GET never gets a body no matter what is
//! configured, and the other verbs must end up with one.

use crate::models::{CallTemplate, HttpMethod, MultipartFilePart};
use crate::variables::scope;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while constructing a payload. All fatal, all before any
/// network I/O.
#[derive(Debug)]
pub enum PayloadError {
    /// Multipart files are configured but the content type is not
    /// `multipart/*`.
    MultipartContentType(String),

    /// Form fields are configured but the content type is not
    /// `application/x-www-form-urlencoded`.
    FormContentType(String),

    /// A body-carrying verb ended up with no body source at all.
    NoBody(HttpMethod),

    /// A body or multipart source file could not be read.
    FileRead { path: PathBuf, source: io::Error },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::MultipartContentType(got) => write!(
                f,
                "multipart files require a multipart/* content type, got '{}'",
                got
            ),
            PayloadError::FormContentType(got) => write!(
                f,
                "form fields require content type application/x-www-form-urlencoded, got '{}'",
                got
            ),
            PayloadError::NoBody(method) => write!(f, "{} with no body specified", method),
            PayloadError::FileRead { path, source } => {
                write!(f, "can't read body file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PayloadError {}

/// The single body a request will carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body at all (every GET, nothing else).
    None,
    /// Raw bytes from the inline body or an external body file.
    Raw(Vec<u8>),
    /// Multipart form-data parts, already read and substituted.
    Multipart(Vec<PreparedPart>),
    /// URL-encoded form fields, already substituted, in document order.
    Form(Vec<(String, String)>),
}

/// One multipart part with its content resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPart {
    /// Form-data field name.
    pub name: String,
    /// Form-data filename.
    pub filename: String,
    /// Part content type. `None` lets the transport omit it.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Builds the payload for a call by source precedence. `body_file` is the
/// optional file reference given on the command line, resolved against the
/// workspace's `bodies/` directory like multipart paths are.
pub fn build_payload(
    template: &CallTemplate,
    vars: &BTreeMap<String, String>,
    bodies_dir: &Path,
    body_file: Option<&str>,
) -> Result<Payload, PayloadError> {
    if !template.method.has_body() {
        return Ok(Payload::None);
    }

    if !template.multipart_files.is_empty() {
        if !template.content_type.starts_with("multipart/") {
            return Err(PayloadError::MultipartContentType(
                template.content_type.clone(),
            ));
        }
        let parts = template
            .multipart_files
            .iter()
            .map(|part| prepare_part(part, vars, bodies_dir))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Payload::Multipart(parts));
    }

    if !template.form.is_empty() {
        if template.content_type != "application/x-www-form-urlencoded" {
            return Err(PayloadError::FormContentType(template.content_type.clone()));
        }
        return Ok(Payload::Form(scope::substitute_pairs(&template.form, vars)));
    }

    if let Some(file) = body_file {
        let path = bodies_dir.join(file);
        let bytes = read_file(&path)?;
        let data = if template.body_substitute_vars {
            scope::substitute(&String::from_utf8_lossy(&bytes), vars).into_bytes()
        } else {
            bytes
        };
        return Ok(Payload::Raw(data));
    }

    if let Some(body) = &template.body {
        let data = if template.body_substitute_vars {
            scope::substitute(body, vars)
        } else {
            body.clone()
        };
        return Ok(Payload::Raw(data.into_bytes()));
    }

    Err(PayloadError::NoBody(template.method))
}

fn prepare_part(
    part: &MultipartFilePart,
    vars: &BTreeMap<String, String>,
    bodies_dir: &Path,
) -> Result<PreparedPart, PayloadError> {
    let path = bodies_dir.join(&part.path);
    let bytes = read_file(&path)?;
    let data = if part.substitute_vars {
        scope::substitute(&String::from_utf8_lossy(&bytes), vars).into_bytes()
    } else {
        bytes
    };
    let filename = part.filename.clone().unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| part.path.clone())
    });
    Ok(PreparedPart {
        name: part.name.clone(),
        filename,
        content_type: resolve_part_content_type(part, &path),
        data,
    })
}

/// The part's explicit content type when it parses as a MIME type, else a
/// probe from the file extension, else nothing.
fn resolve_part_content_type(part: &MultipartFilePart, path: &Path) -> Option<String> {
    if let Some(explicit) = &part.content_type {
        if explicit.parse::<mime_guess::mime::Mime>().is_ok() {
            return Some(explicit.clone());
        }
    }
    mime_guess::from_path(path).first().map(|mime| mime.to_string())
}

fn read_file(path: &Path) -> Result<Vec<u8>, PayloadError> {
    fs::read(path).map_err(|source| PayloadError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
