//! Seed input
//!
//! Seeds are read from a file in one of two formats:
//! - `text`: one URL per line, blank lines skipped
//! - `jsonl`: one `{"url": "...", "metadata": {...}}` object per line
//!
//! URLs are kept as written. The coordinator normalizes them and skips
//! seeds that fail normalization.

use crate::config::InputFormat;
use crate::state::Metadata;
use crate::TrawlError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A starting URL with optional metadata for its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub url: String,
    pub metadata: Option<Metadata>,
}

impl Seed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            metadata: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonSeed {
    url: String,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Loads seeds from a file
///
/// # Arguments
///
/// * `path` - Path to the seed file
/// * `format` - How each line is encoded
///
/// # Returns
///
/// * `Ok(Vec<Seed>)` - Seeds in file order
/// * `Err(TrawlError)` - The file could not be read or a line is malformed
pub fn load_seeds(path: &Path, format: InputFormat) -> Result<Vec<Seed>, TrawlError> {
    let content = std::fs::read_to_string(path)?;
    let seeds = parse_seeds(&content, format)?;
    tracing::info!("Loaded {} seed(s) from {}", seeds.len(), path.display());
    Ok(seeds)
}

/// Parses seeds from text
pub fn parse_seeds(content: &str, format: InputFormat) -> Result<Vec<Seed>, TrawlError> {
    let mut seeds = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let seed = match format {
            InputFormat::Text => Seed::new(line),
            InputFormat::Jsonl => parse_json_seed(line, index + 1)?,
        };
        seeds.push(seed);
    }

    Ok(seeds)
}

fn parse_json_seed(line: &str, line_no: usize) -> Result<Seed, TrawlError> {
    let parsed: JsonSeed = serde_json::from_str(line).map_err(|e| TrawlError::Seed {
        line: line_no,
        message: e.to_string(),
    })?;

    // Non-string values keep their JSON text
    let metadata = parsed.metadata.map(|values| {
        values
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect::<Metadata>()
    });

    Ok(Seed {
        url: parsed.url,
        metadata,
    })
}
