//! Blocking HTTP execution for prepared calls.
//!
//! By the time a call reaches this module every variable has been
//! substituted and the payload fully built, so execution is a single
//! synchronous exchange: send, drain the body, clock the round trip.

pub mod error;

pub use error::NetworkError;

use crate::models::{CallResponse, HttpMethod};
use crate::payload::Payload;
use reqwest::blocking::{multipart, Client};
use std::time::Instant;

/// A call with every variable substituted, ready to go on the wire.
#[derive(Debug)]
pub struct PreparedCall {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub content_type: String,
    pub payload: Payload,
}

/// Sends the call and drains the response body. The elapsed time covers
/// the full exchange, from first byte out to last byte in.
pub fn execute_call(call: PreparedCall) -> Result<CallResponse, NetworkError> {
    let url = url::Url::parse(&call.url)?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(NetworkError::UnsupportedScheme(other.to_string())),
    }

    // Transport defaults only: no retry, no custom timeout. A call
    // either completes or fails outright.
    let client = Client::builder().build()?;

    let method = match call.method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
    };

    let has_content_type_header = call
        .headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));

    let mut builder = client.request(method, url);
    for (name, value) in &call.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder = match call.payload {
        Payload::None => builder,
        Payload::Raw(data) => {
            // The template's content type only fills the gap; an explicit
            // header on the call wins.
            if !has_content_type_header {
                builder =
                    builder.header(reqwest::header::CONTENT_TYPE, call.content_type.as_str());
            }
            builder.body(data)
        }
        Payload::Form(fields) => builder.form(&fields),
        Payload::Multipart(parts) => {
            let mut form = multipart::Form::new();
            for part in parts {
                let mut piece = multipart::Part::bytes(part.data).file_name(part.filename);
                if let Some(content_type) = &part.content_type {
                    piece = piece.mime_str(content_type)?;
                }
                form = form.part(part.name, piece);
            }
            builder.multipart(form)
        }
    };

    let started = Instant::now();
    let response = builder.send()?;
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();
    let body = response.bytes()?.to_vec();

    Ok(CallResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        headers,
        body,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_call(url: &str) -> PreparedCall {
        PreparedCall {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            content_type: "application/json".to_string(),
            payload: Payload::None,
        }
    }

    #[test]
    fn test_unparseable_url_is_rejected() {
        let err = execute_call(bare_call("not a url")).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let err = execute_call(bare_call("ftp://example.com/file")).unwrap_err();
        match err {
            NetworkError::UnsupportedScheme(scheme) => assert_eq!(scheme, "ftp"),
            other => panic!("expected UnsupportedScheme, got {:?}", other),
        }
    }
}
