//! Restartable record sequences.
//!
//! Variant discovery and classification each run their own bounded scan, so
//! a [`RecordSource`] must hand out a fresh iterator starting at the first
//! record every time [`RecordSource::records`] is called.

use std::path::Path;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde_json::Value as JsonValue;

use crate::{io_utils, value::Value};

pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Value>> + 'a>;

pub trait RecordSource {
    fn records(&self) -> Result<RecordIter<'_>>;
}

impl RecordSource for [Value] {
    fn records(&self) -> Result<RecordIter<'_>> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }
}

impl RecordSource for Vec<Value> {
    fn records(&self) -> Result<RecordIter<'_>> {
        self.as_slice().records()
    }
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn records(&self) -> Result<RecordIter<'_>> {
        (**self).records()
    }
}

/// A stream of JSON documents (JSON Lines, or any whitespace-separated
/// sequence), decoded once and re-parsed lazily on each pass.
#[derive(Debug, Clone)]
pub struct JsonRecords {
    origin: String,
    text: String,
}

impl JsonRecords {
    pub fn from_text(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    pub fn load(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let text = io_utils::read_text(path, encoding)?;
        let origin = if io_utils::is_dash(path) {
            "stdin".to_string()
        } else {
            path.display().to_string()
        };
        Ok(Self::from_text(origin, text))
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl RecordSource for JsonRecords {
    fn records(&self) -> Result<RecordIter<'_>> {
        let stream = serde_json::Deserializer::from_str(&self.text).into_iter::<JsonValue>();
        Ok(Box::new(stream.enumerate().map(move |(idx, item)| {
            item.map(Value::from)
                .with_context(|| format!("Parsing record {} from {}", idx + 1, self.origin))
        })))
    }
}
