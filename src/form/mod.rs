// execdemo/src/form/mod.rs
//
// Copyright (c) 2025 Arcella Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! `application/x-www-form-urlencoded` body encoding.
//!
//! Keys and values are percent-escaped individually, so a value containing
//! `&` or `=` can never split into extra pairs.

use crate::error::{ExecError, Result as ExecdemoResult};

/// MIME type sent with every `/exec` request.
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encodes ordered `key=value` pairs joined by `&`.
pub fn encode<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decodes a form body back into ordered pairs.
///
/// `+` is accepted as an encoded space. A segment without `=` yields an empty value.
pub fn decode(body: &str) -> ExecdemoResult<Vec<(String, String)>> {
    if body.is_empty() {
        return Ok(vec![]);
    }

    body.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> ExecdemoResult<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| ExecError::Form(format!("'{}': {}", raw, e)))
}
