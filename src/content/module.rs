//! Content module text format
//!
//! A content file is a small TypeScript module whose data object is a JSON
//! literal:
//!
//! ```text
//!
//! const content = { ... };
//!
//! export type PageContent = typeof content;
//! export default content;
//! ```
//!
//! The type alias is for editors reading the file; only the literal is data.

use crate::content::ContentRecord;
use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Name of the type alias emitted alongside the data
pub const TYPE_ALIAS: &str = "PageContent";

/// Render a record as module text
///
/// Output is deterministic: keys keep record order and JSON is indented with
/// two spaces, so an unchanged record produces identical bytes.
pub fn to_module(record: &ContentRecord) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record
        .serialize(&mut ser)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    let json = String::from_utf8(buf).map_err(|e| Error::Serialization(e.to_string()))?;

    Ok(format!(
        "\nconst content = {json};\n\nexport type {TYPE_ALIAS} = typeof content;\nexport default content;\n"
    ))
}

/// Extract the data object from module text
///
/// Accepts an optional type annotation on the declaration and ignores any
/// interfaces or type aliases around it.
pub fn from_module(source: &str) -> Result<ContentRecord> {
    let decl = declaration_regex()
        .find(source)
        .ok_or_else(|| Error::Serialization("no `const content = ...` declaration found".into()))?;

    let literal = &source[decl.end()..];
    let value = serde_json::Deserializer::from_str(literal)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| Error::Serialization("content declaration has no value".into()))?
        .map_err(|e| Error::Serialization(format!("content literal is not valid JSON: {e}")))?;

    ContentRecord::from_value(value)
}

/// Decode module bytes fetched from the host
pub fn from_module_bytes(bytes: &[u8]) -> Result<ContentRecord> {
    let source = std::str::from_utf8(bytes)
        .map_err(|e| Error::Serialization(format!("content file is not UTF-8: {e}")))?;
    from_module(source)
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bconst\s+content\s*(?::\s*[A-Za-z_$][\w$.<>\[\]]*\s*)?=")
            .expect("hardcoded declaration pattern is valid")
    })
}
