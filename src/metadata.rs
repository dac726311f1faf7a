//! The metadata model: self-describing command records, serializable to and from a JSON document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A closed enumeration of receive-deadline presets, expressed in milliseconds on the wire.
///
/// Carried on the wire as a plain integer via [`TimeoutClass::millis`]/[`TimeoutClass::from_millis`],
/// never through serde, so this type does not derive `Serialize`/`Deserialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    /// 300 ms. The default deadline for the metadata probe and for most commands.
    Default,
    /// 30 000 ms. For commands whose handler may legitimately run long.
    Long,
}

impl TimeoutClass {
    pub const DEFAULT_MS: u64 = 300;
    pub const LONG_MS: u64 = 30_000;

    /// Returns the millisecond value for this preset.
    pub const fn millis(self) -> u64 {
        match self {
            TimeoutClass::Default => Self::DEFAULT_MS,
            TimeoutClass::Long => Self::LONG_MS,
        }
    }

    /// Parses the wire integer millisecond value, rejecting anything outside the enumeration.
    pub fn from_millis(value: u64) -> Result<Self, MetadataError> {
        match value {
            Self::DEFAULT_MS => Ok(TimeoutClass::Default),
            Self::LONG_MS => Ok(TimeoutClass::Long),
            other => Err(MetadataError::UnknownTimeout(other)),
        }
    }
}

/// `{name, description}` — one argument's documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub description: String,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A tagged variant over the three shapes a command's arguments can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentShape {
    /// The command takes no arguments.
    None,
    /// The command takes zero or more arguments, all sharing the given descriptor.
    VariableLength(ArgumentDescriptor),
    /// The command takes exactly the listed, positionally-matched arguments.
    List(Vec<ArgumentDescriptor>),
}

impl ArgumentShape {
    /// Serializes this shape into its JSON document form.
    pub fn to_document(&self) -> Value {
        match self {
            ArgumentShape::None => json!({ "type": "none" }),
            ArgumentShape::VariableLength(descriptor) => json!({
                "type": "variable_length",
                "argument": descriptor,
            }),
            ArgumentShape::List(items) => json!({
                "type": "list",
                "arguments": items,
            }),
        }
    }

    /// Parses the JSON document form, rejecting an unknown `type` discriminator.
    pub fn from_document(value: &Value) -> Result<Self, MetadataError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MetadataError::MissingField("arguments.type"))?;

        match tag {
            "none" => Ok(ArgumentShape::None),
            "variable_length" => {
                let descriptor = value
                    .get("argument")
                    .ok_or(MetadataError::MissingField("arguments.argument"))?;
                let descriptor: ArgumentDescriptor = serde_json::from_value(descriptor.clone())
                    .map_err(|e| MetadataError::Malformed(e.to_string()))?;
                Ok(ArgumentShape::VariableLength(descriptor))
            }
            "list" => {
                let items = value
                    .get("arguments")
                    .ok_or(MetadataError::MissingField("arguments.arguments"))?;
                let items: Vec<ArgumentDescriptor> = serde_json::from_value(items.clone())
                    .map_err(|e| MetadataError::Malformed(e.to_string()))?;
                Ok(ArgumentShape::List(items))
            }
            other => Err(MetadataError::UnknownArgumentShape(other.to_string())),
        }
    }
}

/// The self-describing record of a command: name, description, timeout class, argument shape,
/// and human-readable `returns`/`errors` documentation (not machine-enforced contracts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub timeout: TimeoutClass,
    pub arguments: ArgumentShape,
    pub returns: String,
    pub errors: String,
}

impl Metadata {
    /// Serializes this record into its JSON document form.
    pub fn to_document(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "timeout": self.timeout.millis(),
            "arguments": self.arguments.to_document(),
            "returns": self.returns,
            "errors": self.errors,
        })
    }

    /// Parses the JSON document form, rejecting unknown timeout values or argument-shape tags.
    pub fn from_document(value: &Value) -> Result<Self, MetadataError> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or(MetadataError::MissingField("name"))?
            .to_string();
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .ok_or(MetadataError::MissingField("description"))?
            .to_string();
        let timeout = value
            .get("timeout")
            .and_then(Value::as_u64)
            .ok_or(MetadataError::MissingField("timeout"))?;
        let timeout = TimeoutClass::from_millis(timeout)?;
        let arguments = value
            .get("arguments")
            .ok_or(MetadataError::MissingField("arguments"))?;
        let arguments = ArgumentShape::from_document(arguments)?;
        let returns = value
            .get("returns")
            .and_then(Value::as_str)
            .ok_or(MetadataError::MissingField("returns"))?
            .to_string();
        let errors = value
            .get("errors")
            .and_then(Value::as_str)
            .ok_or(MetadataError::MissingField("errors"))?
            .to_string();

        Ok(Metadata {
            name,
            description,
            timeout,
            arguments,
            returns,
            errors,
        })
    }
}

/// Errors raised while decoding a metadata document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata document is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("metadata document has malformed field: {0}")]
    Malformed(String),
    #[error("unknown timeout value: {0}ms")]
    UnknownTimeout(u64),
    #[error("unknown argument shape tag: {0:?}")]
    UnknownArgumentShape(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(arguments: ArgumentShape) -> Metadata {
        Metadata {
            name: "echo".into(),
            description: "Echoes back the given arguments.".into(),
            timeout: TimeoutClass::Default,
            arguments,
            returns: "the same arguments, unchanged".into(),
            errors: "none".into(),
        }
    }

    #[test]
    fn timeout_class_rejects_unknown_values() {
        assert_eq!(TimeoutClass::from_millis(300).unwrap(), TimeoutClass::Default);
        assert_eq!(TimeoutClass::from_millis(30_000).unwrap(), TimeoutClass::Long);
        assert!(TimeoutClass::from_millis(1000).is_err());
    }

    #[test]
    fn argument_shape_roundtrips_all_three_variants() {
        for shape in [
            ArgumentShape::None,
            ArgumentShape::VariableLength(ArgumentDescriptor::new("x", "any")),
            ArgumentShape::List(vec![
                ArgumentDescriptor::new("a", "first"),
                ArgumentDescriptor::new("b", "second"),
            ]),
        ] {
            let document = shape.to_document();
            assert_eq!(ArgumentShape::from_document(&document).unwrap(), shape);
        }
    }

    #[test]
    fn argument_shape_rejects_unknown_tag() {
        let document = json!({ "type": "nonsense" });
        assert!(matches!(
            ArgumentShape::from_document(&document),
            Err(MetadataError::UnknownArgumentShape(_))
        ));
    }

    #[test]
    fn metadata_roundtrips_through_document() {
        let metadata = sample(ArgumentShape::VariableLength(ArgumentDescriptor::new(
            "x", "any",
        )));
        let document = metadata.to_document();
        assert_eq!(Metadata::from_document(&document).unwrap(), metadata);
    }

    #[test]
    fn metadata_decode_rejects_unknown_timeout() {
        let mut document = sample(ArgumentShape::None).to_document();
        document["timeout"] = json!(12345);
        assert!(matches!(
            Metadata::from_document(&document),
            Err(MetadataError::UnknownTimeout(12345))
        ));
    }
}
