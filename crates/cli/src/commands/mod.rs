//! Subcommand implementations

pub mod catalog;
pub mod estimate;
pub mod savings;
pub mod settings;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;

/// Read a JSON document from a file, or stdin for `-`
pub fn read_json_input(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Build a configuration map from `key=value` pairs
///
/// Values that parse as JSON (numbers, booleans, objects) keep that type;
/// anything else is a string.
pub fn parse_assignments(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut configuration = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("Expected key=value, got '{}'", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Empty key in '{}'", pair);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        configuration.insert(key.to_string(), value);
    }
    Ok(configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_assignments_types() {
        let config = parse_assignments(&[
            "instance_type=t3.xlarge".to_string(),
            "instances=3".to_string(),
            "multi_az=true".to_string(),
            "storage=100 GB".to_string(),
        ])
        .unwrap();

        assert_eq!(config["instance_type"], json!("t3.xlarge"));
        assert_eq!(config["instances"], json!(3));
        assert_eq!(config["multi_az"], json!(true));
        assert_eq!(config["storage"], json!("100 GB"));
    }

    #[test]
    fn test_parse_assignments_rejects_bare_words() {
        assert!(parse_assignments(&["instances".to_string()]).is_err());
        assert!(parse_assignments(&["=3".to_string()]).is_err());
    }

    #[test]
    fn test_read_json_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"services": []}}"#).unwrap();
        assert_eq!(read_json_input(file.path()).unwrap(), json!({"services": []}));

        let mut bad = NamedTempFile::new().unwrap();
        write!(bad, "services:").unwrap();
        assert!(read_json_input(bad.path()).is_err());
    }
}
