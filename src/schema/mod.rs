//! Declarative schema for resources and data sources.
//!
//! A [`Schema`] names every attribute a resource accepts or computes, its value
//! type, its optional/required/computed flags and any allowed-value enum.
//! Configuration is validated against it before any request is made.

pub mod resource_data;

pub use resource_data::ResourceData;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Value types an attribute can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Bool,
    Int,
    List,
    Set,
    Map,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::List => "list",
            ValueType::Set => "set",
            ValueType::Map => "map",
        };
        f.write_str(name)
    }
}

/// Element of a collection attribute: a primitive or a nested block
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Elem {
    Type(ValueType),
    Block(Schema),
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One attribute of a schema
#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<Elem>>,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub computed: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl Attribute {
    fn of(value_type: ValueType, elem: Option<Elem>) -> Self {
        Self {
            value_type,
            elem: elem.map(Box::new),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            allowed_values: Vec::new(),
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::of(ValueType::String, None)
    }

    pub fn bool() -> Self {
        Self::of(ValueType::Bool, None)
    }

    pub fn int() -> Self {
        Self::of(ValueType::Int, None)
    }

    pub fn list_of(block: Schema) -> Self {
        Self::of(ValueType::List, Some(Elem::Block(block)))
    }

    pub fn set_of(block: Schema) -> Self {
        Self::of(ValueType::Set, Some(Elem::Block(block)))
    }

    pub fn string_list() -> Self {
        Self::of(ValueType::List, Some(Elem::Type(ValueType::String)))
    }

    pub fn string_set() -> Self {
        Self::of(ValueType::Set, Some(Elem::Type(ValueType::String)))
    }

    pub fn string_map() -> Self {
        Self::of(ValueType::Map, Some(Elem::Type(ValueType::String)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Restrict string values (or string elements) to the given set
    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.allowed_values = values.to_vec();
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Only the server sets this attribute
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn block(&self) -> Option<&Schema> {
        match self.elem.as_deref() {
            Some(Elem::Block(schema)) => Some(schema),
            _ => None,
        }
    }

    fn elem_type(&self) -> Option<ValueType> {
        match self.elem.as_deref() {
            Some(Elem::Type(t)) => Some(*t),
            _ => None,
        }
    }
}

/// Ordered set of named attributes
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    /// Combine two schemas; attributes of `other` win on name clashes
    pub fn merge(mut self, other: Schema) -> Self {
        self.attributes.extend(other.attributes);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Validate a configuration object, returning every problem found
    pub fn validate(&self, config: &Map<String, Value>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.validate_at("", config, &mut diagnostics);
        diagnostics
    }

    fn validate_at(&self, prefix: &str, config: &Map<String, Value>, diags: &mut Vec<Diagnostic>) {
        for (key, value) in config {
            let path = join_path(prefix, key);

            let Some(attribute) = self.attributes.get(key) else {
                diags.push(Diagnostic::error(&path, "unsupported attribute"));
                continue;
            };

            if value.is_null() {
                continue;
            }

            if attribute.is_computed_only() {
                diags.push(Diagnostic::error(
                    &path,
                    "attribute is computed by the server and cannot be set",
                ));
                continue;
            }

            validate_value(&path, attribute, value, diags);
        }

        for (name, attribute) in &self.attributes {
            if !attribute.required {
                continue;
            }

            let present = config.get(name).map(|v| !v.is_null()).unwrap_or(false);
            if !present {
                diags.push(Diagnostic::error(
                    &join_path(prefix, name),
                    "attribute is required",
                ));
            }
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn primitive_matches(value_type: ValueType, value: &Value) -> bool {
    match value_type {
        // numbers and bools are accepted and stringified on expand
        ValueType::String => value.is_string() || value.is_number() || value.is_boolean(),
        ValueType::Bool => value.is_boolean(),
        ValueType::Int => {
            value.is_i64()
                || value
                    .as_str()
                    .map(|s| s.trim().parse::<i64>().is_ok())
                    .unwrap_or(false)
        }
        ValueType::List | ValueType::Set => value.is_array(),
        ValueType::Map => value.is_object(),
    }
}

fn check_allowed(path: &str, allowed: &[&'static str], value: &Value, diags: &mut Vec<Diagnostic>) {
    if allowed.is_empty() {
        return;
    }

    let Some(text) = value.as_str() else {
        return;
    };

    if !allowed.contains(&text) {
        diags.push(Diagnostic::error(
            path,
            format!(
                "expected one of: {}, got '{}'",
                allowed.join(", "),
                text
            ),
        ));
    }
}

fn validate_value(path: &str, attribute: &Attribute, value: &Value, diags: &mut Vec<Diagnostic>) {
    if !primitive_matches(attribute.value_type, value) {
        diags.push(Diagnostic::error(
            path,
            format!("expected a value of type {}", attribute.value_type),
        ));
        return;
    }

    match attribute.value_type {
        ValueType::List | ValueType::Set => {
            let items = value.as_array().map(Vec::as_slice).unwrap_or_default();

            for (idx, item) in items.iter().enumerate() {
                let item_path = format!("{}.{}", path, idx);

                if let Some(block) = attribute.block() {
                    match item.as_object() {
                        Some(obj) => block.validate_at(&item_path, obj, diags),
                        None => diags.push(Diagnostic::error(&item_path, "expected a block")),
                    }
                } else if let Some(elem_type) = attribute.elem_type() {
                    if !primitive_matches(elem_type, item) {
                        diags.push(Diagnostic::error(
                            &item_path,
                            format!("expected a value of type {}", elem_type),
                        ));
                    } else {
                        check_allowed(&item_path, &attribute.allowed_values, item, diags);
                    }
                }
            }
        }
        ValueType::Map => {
            if let (Some(elem_type), Some(obj)) = (attribute.elem_type(), value.as_object()) {
                for (key, item) in obj {
                    if !primitive_matches(elem_type, item) {
                        diags.push(Diagnostic::error(
                            &format!("{}.{}", path, key),
                            format!("expected a value of type {}", elem_type),
                        ));
                    }
                }
            }
        }
        _ => check_allowed(path, &attribute.allowed_values, value, diags),
    }
}

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem or notice attached to an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(attribute: &str, summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            attribute: Some(attribute.to_string()),
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            attribute: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{}: {}", attribute, self.summary),
            None => f.write_str(&self.summary),
        }
    }
}
