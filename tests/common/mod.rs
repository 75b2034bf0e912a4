#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tempfile::{TempDir, tempdir};
use variant_view::{schema::Schema, value::Value};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes one JSON document per line.
    pub fn write_records(&self, name: &str, records: &[JsonValue]) -> PathBuf {
        let contents = records
            .iter()
            .map(JsonValue::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        self.write(name, &contents)
    }
}

pub fn int() -> Schema {
    Schema::primitive("int")
}

/// `{a: union(int, record{b: int})}`
pub fn int_or_nested_schema() -> Schema {
    Schema::record([(
        "a",
        Schema::union([int(), Schema::record([("b", int())])]),
    )])
}

pub fn records(documents: &[JsonValue]) -> Vec<Value> {
    documents.iter().map(Value::from).collect()
}
