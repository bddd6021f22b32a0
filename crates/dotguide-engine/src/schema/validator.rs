use serde_json::{Map, Number, Value, json};

use super::Violation;
use super::compile::{JsonSchema, Node, Rules};

/// Validates `instance` against `schema`, collecting every violation.
pub fn validate(schema: &JsonSchema, instance: &Value) -> Vec<Violation> {
    let mut context = ValidationContext::new();
    validate_node(&schema.root, instance, &mut context);
    context.violations
}

/// Tracks where in the instance validation currently is.
struct ValidationContext {
    /// Unescaped path segments from the root to the current value.
    path: Vec<String>,
    violations: Vec<Violation>,
}

impl ValidationContext {
    fn new() -> Self {
        Self {
            path: Vec::new(),
            violations: Vec::new(),
        }
    }

    /// JSON pointer for the current value.
    fn pointer(&self) -> String {
        self.path
            .iter()
            .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
            .collect()
    }

    fn report(&mut self, keyword: &str, message: impl Into<String>, params: Map<String, Value>) {
        self.violations.push(Violation {
            path: self.pointer(),
            keyword: keyword.to_string(),
            message: message.into(),
            params,
        });
    }

    fn with_segment<R>(&mut self, segment: impl ToString, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment.to_string());
        let result = f(self);
        self.path.pop();
        result
    }
}

fn params(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn validate_node(node: &Node, value: &Value, context: &mut ValidationContext) {
    match node {
        Node::Bool(true) => {}
        Node::Bool(false) => context.report("false schema", "boolean schema is false", Map::new()),
        Node::Rules(rules) => validate_rules(rules, value, context),
    }
}

fn validate_rules(rules: &Rules, value: &Value, context: &mut ValidationContext) {
    if !rules.types.is_empty() && !rules.types.iter().any(|ty| ty.matches(value)) {
        let expected = rules
            .types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        context.report(
            "type",
            format!("must be {expected}"),
            params([("type", json!(expected))]),
        );
        return;
    }

    match value {
        Value::Object(map) => validate_object(rules, map, context),
        Value::Array(items) => validate_array(rules, items, context),
        Value::String(s) => validate_string(rules, s, context),
        Value::Number(n) => validate_number(rules, n, context),
        Value::Null | Value::Bool(_) => {}
    }
}

fn validate_object(rules: &Rules, map: &Map<String, Value>, context: &mut ValidationContext) {
    for name in &rules.required {
        if !map.contains_key(name) {
            context.report(
                "required",
                format!("must have required property '{name}'"),
                params([("missingProperty", json!(name))]),
            );
        }
    }

    if let Some(additional) = &rules.additional_properties {
        for (key, value) in map {
            if rules.properties.contains_key(key) {
                continue;
            }
            match additional {
                Node::Bool(false) => context.report(
                    "additionalProperties",
                    "must NOT have additional properties",
                    params([("additionalProperty", json!(key))]),
                ),
                schema => context.with_segment(key, |ctx| validate_node(schema, value, ctx)),
            }
        }
    }

    for (name, schema) in &rules.properties {
        if let Some(value) = map.get(name) {
            context.with_segment(name, |ctx| validate_node(schema, value, ctx));
        }
    }
}

fn validate_array(rules: &Rules, items: &[Value], context: &mut ValidationContext) {
    if let Some(max) = rules.max_items
        && items.len() > max
    {
        context.report(
            "maxItems",
            format!("must NOT have more than {max} items"),
            params([("limit", json!(max))]),
        );
    }
    if let Some(min) = rules.min_items
        && items.len() < min
    {
        context.report(
            "minItems",
            format!("must NOT have fewer than {min} items"),
            params([("limit", json!(min))]),
        );
    }

    if let Some(schema) = &rules.items {
        for (index, item) in items.iter().enumerate() {
            context.with_segment(index, |ctx| validate_node(schema, item, ctx));
        }
    }
}

fn validate_string(rules: &Rules, s: &str, context: &mut ValidationContext) {
    let length = s.chars().count();

    if let Some(max) = rules.max_length
        && length > max
    {
        context.report(
            "maxLength",
            format!("must NOT have more than {max} characters"),
            params([("limit", json!(max))]),
        );
    }
    if let Some(min) = rules.min_length
        && length < min
    {
        context.report(
            "minLength",
            format!("must NOT have fewer than {min} characters"),
            params([("limit", json!(min))]),
        );
    }
    if let Some(pattern) = &rules.pattern
        && !pattern.is_match(s)
    {
        context.report(
            "pattern",
            format!("must match pattern \"{}\"", pattern.as_str()),
            params([("pattern", json!(pattern.as_str()))]),
        );
    }
}

fn validate_number(rules: &Rules, n: &Number, context: &mut ValidationContext) {
    let Some(value) = n.as_f64() else {
        return;
    };

    if let Some(max) = &rules.maximum
        && max.as_f64().is_some_and(|limit| value > limit)
    {
        context.report(
            "maximum",
            format!("must be <= {max}"),
            params([("comparison", json!("<=")), ("limit", json!(max))]),
        );
    }
    if let Some(min) = &rules.minimum
        && min.as_f64().is_some_and(|limit| value < limit)
    {
        context.report(
            "minimum",
            format!("must be >= {min}"),
            params([("comparison", json!(">=")), ("limit", json!(min))]),
        );
    }
}
