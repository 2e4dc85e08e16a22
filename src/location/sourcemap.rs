//! Minimal reader for version 3 source maps.
//!
//! Only what the generator needs: the list of original sources (to recognise
//! compiled copies of generated files) and generated → original position
//! lookup with greatest-lower-bound semantics on the column.

use super::LocateError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct RawSourceMap {
    #[serde(default)]
    sources: Vec<Option<String>>,
    #[serde(default, rename = "sourceRoot")]
    source_root: Option<String>,
    #[serde(default)]
    mappings: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    generated_column: u32,
    original: Option<OriginalPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OriginalPosition {
    source: u32,
    line: u32,
    column: u32,
}

/// A parsed source map. Lines and columns are zero-based internally.
#[derive(Debug, Clone)]
pub struct SourceMap {
    sources: Vec<PathBuf>,
    lines: Vec<Vec<Segment>>,
}

impl SourceMap {
    pub fn from_file(path: &Path) -> Result<Self, LocateError> {
        let content = std::fs::read_to_string(path).map_err(|source| LocateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse map JSON. Sources are resolved against the map's directory.
    pub fn parse(json: &str, map_path: &Path) -> Result<Self, LocateError> {
        let raw: RawSourceMap =
            serde_json::from_str(json).map_err(|e| LocateError::InvalidSourceMap {
                path: map_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let base = map_path.parent().unwrap_or_else(|| Path::new(""));
        let root = raw.source_root.as_deref().unwrap_or("");
        let sources = raw
            .sources
            .iter()
            .map(|source| {
                let source = source.as_deref().unwrap_or("");
                let source = source.strip_prefix("file://").unwrap_or(source);
                crate::io::paths::normalize(&base.join(root).join(source))
            })
            .collect();

        let lines = decode_mappings(&raw.mappings).map_err(|message| {
            LocateError::InvalidSourceMap {
                path: map_path.to_path_buf(),
                message,
            }
        })?;

        Ok(Self { sources, lines })
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Original `(source, line, column)` for a zero-based generated position.
    pub fn original_position_for(&self, line: u32, column: u32) -> Option<(PathBuf, u32, u32)> {
        let segments = self.lines.get(line as usize)?;
        let segment = segments
            .iter()
            .rev()
            .filter(|s| s.original.is_some())
            .find(|s| s.generated_column <= column)?;
        let original = segment.original?;
        let source = self.sources.get(original.source as usize)?.clone();
        Some((source, original.line, original.column))
    }
}

/// Locate the map for a compiled file: an explicit `sourceMappingURL`
/// (file references only) or a sibling `<file>.map`.
pub fn find_source_map(compiled: &Path, mapping_url: Option<&str>) -> Option<PathBuf> {
    if let Some(url) = mapping_url {
        if url.starts_with("data:") {
            log::debug!("inline source map in {} is not supported", compiled.display());
        } else {
            let url = url.strip_prefix("file://").unwrap_or(url);
            let candidate = compiled
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(url);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    let sibling = PathBuf::from(format!("{}.map", compiled.display()));
    sibling.is_file().then_some(sibling)
}

/// Sources listed by `<file>.map`, if that map exists and parses.
pub fn sibling_map_sources(compiled: &Path) -> Option<Vec<PathBuf>> {
    let map_path = PathBuf::from(format!("{}.map", compiled.display()));
    if !map_path.is_file() {
        return None;
    }
    match SourceMap::from_file(&map_path) {
        Ok(map) => Some(map.sources),
        Err(e) => {
            log::debug!("ignoring unreadable source map: {}", e);
            None
        }
    }
}

fn decode_mappings(mappings: &str) -> Result<Vec<Vec<Segment>>, String> {
    let mut lines = Vec::new();
    let mut source = 0i64;
    let mut original_line = 0i64;
    let mut original_column = 0i64;

    for line in mappings.split(';') {
        let mut generated_column = 0i64;
        let mut segments = Vec::new();
        for encoded in line.split(',').filter(|s| !s.is_empty()) {
            let fields = decode_vlq(encoded)?;
            generated_column += fields[0];
            let original = match fields.len() {
                1 => None,
                // a fifth field (name index) is not needed
                4 | 5 => {
                    source += fields[1];
                    original_line += fields[2];
                    original_column += fields[3];
                    Some(OriginalPosition {
                        source: to_u32(source)?,
                        line: to_u32(original_line)?,
                        column: to_u32(original_column)?,
                    })
                }
                n => return Err(format!("segment `{}` has {} fields", encoded, n)),
            };
            segments.push(Segment {
                generated_column: to_u32(generated_column)?,
                original,
            });
        }
        segments.sort_by_key(|s| s.generated_column);
        lines.push(segments);
    }

    Ok(lines)
}

fn to_u32(value: i64) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("mapping value {} out of range", value))
}

fn decode_vlq(segment: &str) -> Result<Vec<i64>, String> {
    let mut values = Vec::new();
    let mut value = 0i64;
    let mut shift = 0u32;

    for ch in segment.chars() {
        let digit = base64_digit(ch).ok_or_else(|| format!("invalid base64 digit `{}`", ch))?;
        let continuation = digit & 0b10_0000 != 0;
        value += i64::from(digit & 0b1_1111) << shift;
        if continuation {
            shift += 5;
            if shift > 60 {
                return Err(format!("VLQ value too long in `{}`", segment));
            }
        } else {
            let negative = value & 1 == 1;
            let magnitude = value >> 1;
            values.push(if negative { -magnitude } else { magnitude });
            value = 0;
            shift = 0;
        }
    }

    if shift != 0 {
        return Err(format!("truncated VLQ value in `{}`", segment));
    }
    Ok(values)
}

fn base64_digit(ch: char) -> Option<u8> {
    match ch {
        'A'..='Z' => Some(ch as u8 - b'A'),
        'a'..='z' => Some(ch as u8 - b'a' + 26),
        '0'..='9' => Some(ch as u8 - b'0' + 52),
        '+' => Some(62),
        '/' => Some(63),
        _ => None,
    }
}
