//! SQL script loading and `{placeholder}` substitution

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::error::PipelineError;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Placeholder name (without braces) -> replacement text
#[derive(Debug, Clone, Default)]
pub struct Placeholders(BTreeMap<String, String>);

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace every `{name}` token verbatim; unknown tokens are left as-is
    pub fn apply(&self, script: &str) -> String {
        let mut result = script.to_string();
        for (name, value) in &self.0 {
            result = result.replace(&format!("{{{}}}", name), value);
        }
        result
    }
}

/// Tokens that still look like `{name}` placeholders
pub fn unresolved_placeholders(script: &str) -> Vec<String> {
    let mut names: Vec<String> = PLACEHOLDER_REGEX
        .captures_iter(script)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect();
    names.sort();
    names.dedup();
    names
}

pub fn read_script(path: &Path) -> Result<String, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::ScriptNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Read a script from disk and substitute its placeholders
pub fn load_script(path: &Path, placeholders: &Placeholders) -> Result<String, PipelineError> {
    let script = placeholders.apply(&read_script(path)?);

    let leftover = unresolved_placeholders(&script);
    if !leftover.is_empty() {
        debug!(
            script = %path.display(),
            placeholders = ?leftover,
            "Script still contains unsubstituted placeholders"
        );
    }

    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let placeholders = Placeholders::new()
            .with("database_name", "ORDER_DDS")
            .with("schema_name", "dbo");

        let script = "USE {database_name};\nSELECT * FROM {database_name}.{schema_name}.t;";
        assert_eq!(
            placeholders.apply(script),
            "USE ORDER_DDS;\nSELECT * FROM ORDER_DDS.dbo.t;"
        );
    }

    #[test]
    fn test_apply_is_verbatim() {
        let placeholders = Placeholders::new().with("start_date", "1996-07-04' OR '1'='1");
        assert_eq!(
            placeholders.apply("WHERE d >= '{start_date}'"),
            "WHERE d >= '1996-07-04' OR '1'='1'"
        );
    }

    #[test]
    fn test_unknown_placeholders_left_in_place() {
        let placeholders = Placeholders::new().with("schema_name", "dbo");
        let script = placeholders.apply("{schema_name}.{dim_table_name}");

        assert_eq!(script, "dbo.{dim_table_name}");
        assert_eq!(unresolved_placeholders(&script), vec!["dim_table_name"]);
    }

    #[test]
    fn test_load_script() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("update_dim_region.sql");
        fs::write(&path, "TRUNCATE TABLE {schema_name}.{dim_table_name};").unwrap();

        let placeholders = Placeholders::new()
            .with("schema_name", "dbo")
            .with("dim_table_name", "DimRegion");
        let script = load_script(&path, &placeholders).unwrap();

        assert_eq!(script, "TRUNCATE TABLE dbo.DimRegion;");
    }

    #[test]
    fn test_missing_script() {
        let result = load_script(Path::new("/nonexistent/update_fact.sql"), &Placeholders::new());
        assert!(matches!(result, Err(PipelineError::ScriptNotFound(_))));
    }
}
