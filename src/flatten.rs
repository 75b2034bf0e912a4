//! Leaf paths of a concrete variant.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{error::ShapeError, schema::Schema};

/// Field names from the root record down to one scalar column. Array nesting
/// contributes no segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeafPath {
    segments: Vec<String>,
}

impl LeafPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Splits dot-joined text into segments.
    pub fn from_dotted(path: &str) -> Self {
        Self::new(path.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for LeafPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl Serialize for LeafPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.dotted())
    }
}

/// Lists the leaf paths of `variant` in declaration order.
///
/// A primitive root yields no paths. Meeting a union is an invariant
/// violation and aborts with [`ShapeError::UnionInVariant`].
pub fn flatten(variant: &Schema) -> Result<Vec<LeafPath>, ShapeError> {
    let mut paths = Vec::new();
    for segments in flatten_segments(variant, variant)? {
        paths.push(LeafPath::new(segments));
    }
    Ok(paths)
}

/// The declared schema a leaf path of `variant` ends on, looking through
/// array wrappers on the way down.
pub fn leaf_schema<'a>(variant: &'a Schema, path: &LeafPath) -> Option<&'a Schema> {
    let mut current = variant;
    for segment in path.segments() {
        while let Schema::Array(element) = current {
            current = element;
        }
        let Schema::Record(fields) = current else {
            return None;
        };
        current = &fields.iter().find(|field| &field.name == segment)?.schema;
    }
    Some(current)
}

fn flatten_segments(schema: &Schema, root: &Schema) -> Result<Vec<Vec<String>>, ShapeError> {
    match schema {
        Schema::Record(fields) => {
            let mut paths = Vec::new();
            for field in fields {
                let nested = flatten_segments(&field.schema, root)?;
                if nested.is_empty() {
                    paths.push(vec![field.name.clone()]);
                } else {
                    paths.extend(nested.into_iter().map(|mut tail| {
                        tail.insert(0, field.name.clone());
                        tail
                    }));
                }
            }
            Ok(paths)
        }
        Schema::Union(_) => Err(ShapeError::UnionInVariant {
            signature: root.signature(),
        }),
        Schema::Array(element) => flatten_segments(element, root),
        Schema::Primitive(_) => Ok(Vec::new()),
    }
}
