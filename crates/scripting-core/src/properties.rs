//! Minimal flat `key=value` properties parser, enough for
//! `sonar-project.properties`: one pair per line, `#`/`!` comments, values
//! trimmed.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, ScriptError};

#[derive(Debug, Default)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Load a properties file. A missing file is surfaced with the platform's
/// "no such file" message plus the offending path.
pub fn load(path: &Path) -> Result<Properties> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ScriptError::MissingFile {
                path: path.display().to_string(),
                source,
            }
        } else {
            ScriptError::Io(source)
        }
    })?;
    Ok(parse(&text))
}

fn parse(text: &str) -> Properties {
    let mut values = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Properties { values }
}
