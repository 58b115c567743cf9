//! Paths in a plan are written on a single line, byte for byte.
//!
//! A backslash starts an escape: `\\`, `\n`, `\r`, `\t`, or `\xHH` for any
//! other byte. Control characters and bytes that are not UTF-8 are always
//! escaped, as is a space at either end of the path, so that an unedited
//! plan reads back to exactly the paths it was rendered from.

use std::ffi::OsString;
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub fn escape_path(path: &Path) -> String {
    let bytes = path.as_os_str().as_encoded_bytes();
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        for ch in chunk.valid().chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                ch if ch.is_ascii_control() => {
                    let _ = write!(out, "\\x{:02X}", ch as u32);
                },
                ch => out.push(ch),
            }
        }
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{byte:02X}");
        }
    }
    if out.starts_with(' ') {
        out.replace_range(..1, "\\x20");
    }
    if out.ends_with(' ') {
        let last = out.len() - 1;
        out.replace_range(last.., "\\x20");
    }
    out
}

/// Reverse [`escape_path()`]. The error describes the malformed escape.
pub fn unescape_path(text: &str) -> Result<PathBuf, String> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            bytes.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
            continue;
        }
        match chars.next() {
            Some('\\') => bytes.push(b'\\'),
            Some('n') => bytes.push(b'\n'),
            Some('r') => bytes.push(b'\r'),
            Some('t') => bytes.push(b'\t'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(format!("invalid escape \"\\x{hex}\" (expected two hex digits)"));
                }
                bytes.push(u8::from_str_radix(&hex, 16).map_err(|err| err.to_string())?);
            },
            Some(other) => return Err(format!("unknown escape \"\\{other}\" (write \"\\\\\" for a backslash)")),
            None => return Err("path ends with a lone backslash".to_string()),
        }
    }
    os_string(bytes).map(PathBuf::from)
}

#[cfg(unix)]
fn os_string(bytes: Vec<u8>) -> Result<OsString, String> {
    use std::os::unix::ffi::OsStringExt;
    Ok(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn os_string(bytes: Vec<u8>) -> Result<OsString, String> {
    String::from_utf8(bytes)
        .map(OsString::from)
        .map_err(|_| "path is not valid UTF-8".to_string())
}
