//! Writing response bodies to the output directory.
//!
//! Saved bodies land at `{outputDir}/{workspace}/{call}_{timestamp}.{ext}`,
//! where the extension comes from the response content type and the
//! timestamp is UTC with every `:`/`-`/`.` turned into `_` so the name is
//! safe on any filesystem.

use crate::render::essence;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Writes a rendered response body, creating the workspace subdirectory as
/// needed, and returns the path it landed at.
pub fn write_response_body(
    output_dir: &str,
    workspace: &str,
    call_name: &str,
    body: &str,
    content_type: &str,
) -> io::Result<PathBuf> {
    let file_name = response_file_name(call_name, content_type, Utc::now());
    let path = expand_tilde(output_dir)?.join(workspace).join(file_name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, body)?;
    Ok(path)
}

fn response_file_name(call_name: &str, content_type: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        call_name,
        sanitize_timestamp(now),
        extension_for(content_type)
    )
}

/// `text/plain` maps to `txt`; everything else uses the media subtype.
fn extension_for(content_type: &str) -> &str {
    let media_type = essence(content_type);
    if media_type == "text/plain" {
        return "txt";
    }
    match media_type.rsplit('/').next() {
        Some(subtype) if !subtype.is_empty() => subtype,
        _ => "txt",
    }
}

fn sanitize_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .chars()
        .map(|c| match c {
            ':' | '-' | '.' => '_',
            other => other,
        })
        .collect()
}

/// Expands a leading `~/` against the home directory.
pub fn expand_tilde(path: &str) -> io::Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no home directory to expand ~")
        })?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}
