use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde_json::{Map, Number, Value};

use super::SchemaError;

/// A compiled schema, ready to validate any number of instances.
#[derive(Debug, Clone)]
pub struct JsonSchema {
    pub(super) root: Node,
}

impl JsonSchema {
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        Ok(Self {
            root: Node::compile(value, "")?,
        })
    }
}

impl FromStr for JsonSchema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(&value)
    }
}

#[derive(Debug, Clone)]
pub(super) enum Node {
    /// `true` accepts everything, `false` nothing.
    Bool(bool),
    Rules(Box<Rules>),
}

#[derive(Debug, Clone, Default)]
pub(super) struct Rules {
    pub types: Vec<InstanceType>,
    pub properties: BTreeMap<String, Node>,
    pub required: Vec<String>,
    pub additional_properties: Option<Node>,
    pub items: Option<Node>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub pattern: Option<Regex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum InstanceType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl InstanceType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(InstanceType::Null),
            "boolean" => Some(InstanceType::Boolean),
            "object" => Some(InstanceType::Object),
            "array" => Some(InstanceType::Array),
            "number" => Some(InstanceType::Number),
            "integer" => Some(InstanceType::Integer),
            "string" => Some(InstanceType::String),
            _ => None,
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (InstanceType::Null, Value::Null)
            | (InstanceType::Boolean, Value::Bool(_))
            | (InstanceType::Object, Value::Object(_))
            | (InstanceType::Array, Value::Array(_))
            | (InstanceType::Number, Value::Number(_))
            | (InstanceType::String, Value::String(_)) => true,
            (InstanceType::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstanceType::Null => "null",
            InstanceType::Boolean => "boolean",
            InstanceType::Object => "object",
            InstanceType::Array => "array",
            InstanceType::Number => "number",
            InstanceType::Integer => "integer",
            InstanceType::String => "string",
        };
        f.write_str(name)
    }
}

impl Node {
    fn compile(value: &Value, at: &str) -> Result<Self, SchemaError> {
        match value {
            Value::Bool(b) => Ok(Node::Bool(*b)),
            Value::Object(map) => Ok(Node::Rules(Box::new(Rules::compile(map, at)?))),
            _ => Err(SchemaError::NotASchema { at: at.to_string() }),
        }
    }
}

impl Rules {
    fn compile(map: &Map<String, Value>, at: &str) -> Result<Self, SchemaError> {
        let mut rules = Rules::default();

        for (keyword, value) in map {
            match keyword.as_str() {
                "type" => rules.types = types(value, at)?,
                "properties" => {
                    let properties = value
                        .as_object()
                        .ok_or_else(|| invalid(at, "properties", "an object"))?;
                    for (name, schema) in properties {
                        let at = format!("{at}/properties/{name}");
                        rules.properties.insert(name.clone(), Node::compile(schema, &at)?);
                    }
                }
                "required" => {
                    rules.required = value
                        .as_array()
                        .and_then(|names| {
                            names
                                .iter()
                                .map(|name| name.as_str().map(str::to_string))
                                .collect::<Option<Vec<_>>>()
                        })
                        .ok_or_else(|| invalid(at, "required", "an array of strings"))?;
                }
                "additionalProperties" => {
                    let at = format!("{at}/additionalProperties");
                    rules.additional_properties = Some(Node::compile(value, &at)?);
                }
                "items" => {
                    let at = format!("{at}/items");
                    rules.items = Some(Node::compile(value, &at)?);
                }
                "minItems" => rules.min_items = Some(count(value, at, "minItems")?),
                "maxItems" => rules.max_items = Some(count(value, at, "maxItems")?),
                "minLength" => rules.min_length = Some(count(value, at, "minLength")?),
                "maxLength" => rules.max_length = Some(count(value, at, "maxLength")?),
                "minimum" => rules.minimum = Some(number(value, at, "minimum")?),
                "maximum" => rules.maximum = Some(number(value, at, "maximum")?),
                "pattern" => {
                    let pattern = value
                        .as_str()
                        .ok_or_else(|| invalid(at, "pattern", "a string"))?;
                    let regex = Regex::new(pattern).map_err(|source| SchemaError::Pattern {
                        at: at.to_string(),
                        source,
                    })?;
                    rules.pattern = Some(regex);
                }
                _ => {}
            }
        }

        Ok(rules)
    }
}

fn types(value: &Value, at: &str) -> Result<Vec<InstanceType>, SchemaError> {
    let names: Vec<&str> = match value {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names
            .iter()
            .map(Value::as_str)
            .collect::<Option<_>>()
            .ok_or_else(|| invalid(at, "type", "a string or an array of strings"))?,
        _ => return Err(invalid(at, "type", "a string or an array of strings")),
    };

    names
        .into_iter()
        .map(|name| {
            InstanceType::from_name(name).ok_or_else(|| SchemaError::UnknownType {
                at: at.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

fn count(value: &Value, at: &str, keyword: &'static str) -> Result<usize, SchemaError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(at, keyword, "a non-negative integer"))
}

fn number(value: &Value, at: &str, keyword: &'static str) -> Result<Number, SchemaError> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        _ => Err(invalid(at, keyword, "a number")),
    }
}

fn invalid(at: &str, keyword: &'static str, expected: &'static str) -> SchemaError {
    SchemaError::InvalidKeyword {
        at: at.to_string(),
        keyword,
        expected,
    }
}
