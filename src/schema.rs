//! Declared record schema model and its Avro-style JSON/YAML loader.
//!
//! [`Schema`] is a closed sum type over the four node kinds a declared schema
//! may contain. Concrete variants produced by [`crate::expand`] are plain
//! `Schema` values that happen to hold no [`Schema::Union`] node; their
//! identity is the canonical text returned by [`Schema::signature`].
//!
//! ## Loader format
//!
//! - a string is a primitive type name, or a reference to a record named
//!   earlier in the same document
//! - an array is a union of its elements, in order
//! - `{"type": "record", "fields": [{"name": .., "type": ..}]}` is a record
//! - `{"type": "array", "items": ..}` is an array
//! - any other object is a primitive named by its `type`
//!
//! A record may not refer to itself; recursive schemas are rejected.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::Path,
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::{Map, Value as JsonValue, json};

use crate::{error::ShapeError, io_utils};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Record(Vec<Field>),
    Union(Vec<Schema>),
    Array(Box<Schema>),
    Primitive(String),
}

impl Schema {
    pub fn record<I, N>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, Schema)>,
        N: Into<String>,
    {
        Schema::Record(
            fields
                .into_iter()
                .map(|(name, schema)| Field::new(name, schema))
                .collect(),
        )
    }

    pub fn union(alternatives: impl IntoIterator<Item = Schema>) -> Self {
        Schema::Union(alternatives.into_iter().collect())
    }

    pub fn array(element: Schema) -> Self {
        Schema::Array(Box::new(element))
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Schema::Primitive(name.into())
    }

    /// Canonical structural text. Two schemas with equal signatures are the
    /// same variant.
    pub fn signature(&self) -> String {
        self.to_string()
    }

    /// Whether this is the `map` leaf type, whose runtime value is a record of
    /// entries rather than a scalar.
    pub fn is_map(&self) -> bool {
        matches!(self, Schema::Primitive(name) if name == "map")
    }

    pub fn is_union_free(&self) -> bool {
        match self {
            Schema::Record(fields) => fields.iter().all(|field| field.schema.is_union_free()),
            Schema::Union(_) => false,
            Schema::Array(element) => element.is_union_free(),
            Schema::Primitive(_) => true,
        }
    }

    pub fn to_avro_json(&self) -> JsonValue {
        match self {
            Schema::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|field| json!({ "name": field.name, "type": field.schema.to_avro_json() }))
                    .collect::<Vec<_>>();
                json!({ "type": "record", "fields": fields })
            }
            Schema::Union(alternatives) => JsonValue::Array(
                alternatives
                    .iter()
                    .map(Schema::to_avro_json)
                    .collect(),
            ),
            Schema::Array(element) => json!({ "type": "array", "items": element.to_avro_json() }),
            Schema::Primitive(name) => JsonValue::String(name.clone()),
        }
    }

    pub fn from_avro_json(value: &JsonValue) -> Result<Self, ShapeError> {
        SchemaParser::default().parse(value, "$")
    }

    /// Loads a schema document, as YAML when the extension is `.yaml`/`.yml`
    /// and as JSON otherwise.
    pub fn load(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let text = io_utils::read_text(path, encoding)?;
        let document: JsonValue = if io_utils::has_yaml_extension(path) {
            serde_yaml::from_str(&text)
                .with_context(|| format!("Parsing YAML schema from {path:?}"))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("Parsing JSON schema from {path:?}"))?
        };
        let schema = Schema::from_avro_json(&document)
            .with_context(|| format!("Reading schema definition from {path:?}"))?;
        Ok(schema)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Record(fields) => {
                f.write_str("{")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{:?}:{}", field.name, field.schema)?;
                }
                f.write_str("}")
            }
            Schema::Union(alternatives) => {
                f.write_str("<")?;
                for (idx, alternative) in alternatives.iter().enumerate() {
                    if idx > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{alternative}")?;
                }
                f.write_str(">")
            }
            Schema::Array(element) => write!(f, "[{element}]"),
            Schema::Primitive(name) => f.write_str(name),
        }
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_avro_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Schema::from_avro_json(&value).map_err(de::Error::custom)
    }
}

#[derive(Default)]
struct SchemaParser {
    named: HashMap<String, Schema>,
    /// Records whose fields are still being parsed.
    open: HashSet<String>,
}

impl SchemaParser {
    fn parse(&mut self, value: &JsonValue, location: &str) -> Result<Schema, ShapeError> {
        match value {
            JsonValue::String(name) => self.resolve_name(name, location),
            JsonValue::Array(alternatives) => alternatives
                .iter()
                .enumerate()
                .map(|(idx, alternative)| self.parse(alternative, &format!("{location}|{idx}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Schema::Union),
            JsonValue::Object(object) => self.parse_object(object, location),
            other => Err(ShapeError::invalid_schema(
                location,
                format!("expected a type name, union, or object but found {other}"),
            )),
        }
    }

    fn parse_object(
        &mut self,
        object: &Map<String, JsonValue>,
        location: &str,
    ) -> Result<Schema, ShapeError> {
        let type_value = object
            .get("type")
            .ok_or_else(|| ShapeError::invalid_schema(location, "missing 'type'"))?;
        let type_name = match type_value {
            JsonValue::String(name) => name.as_str(),
            JsonValue::Array(_) | JsonValue::Object(_) => return self.parse(type_value, location),
            other => {
                return Err(ShapeError::invalid_schema(
                    location,
                    format!("'type' must be a string, union, or object but found {other}"),
                ));
            }
        };
        match type_name {
            "record" | "error" => {
                let name = object.get("name").and_then(JsonValue::as_str);
                if let Some(name) = name {
                    self.open.insert(name.to_string());
                }
                let record = self.parse_record(object, location);
                if let Some(name) = name {
                    self.open.remove(name);
                    if let Ok(record) = &record {
                        self.named.insert(name.to_string(), record.clone());
                    }
                }
                record
            }
            "array" => {
                let items = object
                    .get("items")
                    .ok_or_else(|| ShapeError::invalid_schema(location, "array is missing 'items'"))?;
                let element = self.parse(items, &format!("{location}[]"))?;
                Ok(Schema::array(element))
            }
            other => self.resolve_name(other, location),
        }
    }

    fn resolve_name(&self, name: &str, location: &str) -> Result<Schema, ShapeError> {
        if self.open.contains(name) {
            return Err(ShapeError::invalid_schema(
                location,
                format!("recursive reference to record '{name}' is not supported"),
            ));
        }
        Ok(self
            .named
            .get(name)
            .cloned()
            .unwrap_or_else(|| Schema::Primitive(name.to_string())))
    }

    fn parse_record(
        &mut self,
        object: &Map<String, JsonValue>,
        location: &str,
    ) -> Result<Schema, ShapeError> {
        let fields = object
            .get("fields")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| ShapeError::invalid_schema(location, "record needs a 'fields' array"))?;
        let mut parsed = Vec::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            let name = field
                .get("name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| {
                    ShapeError::invalid_schema(
                        format!("{location}.fields[{idx}]"),
                        "field is missing a string 'name'",
                    )
                })?;
            let field_location = format!("{location}.{name}");
            let field_type = field.get("type").ok_or_else(|| {
                ShapeError::invalid_schema(&field_location, "field is missing 'type'")
            })?;
            parsed.push(Field::new(name, self.parse(field_type, &field_location)?));
        }
        Ok(Schema::Record(parsed))
    }
}
