use serde_json::{Map, Value};

use super::{Diagnostic, Schema};

/// Desired configuration and stored state of one resource instance.
///
/// Reads consult the configuration only. An update that needs computed values
/// from a previous refresh gets them through [`ResourceData::carry_computed`].
/// Writes via [`ResourceData::set`] always go to the state.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: String,
    config: Map<String, Value>,
    state: Map<String, Value>,
    warnings: Vec<Diagnostic>,
}

impl ResourceData {
    /// Data for a resource that does not exist yet
    pub fn new(config: Map<String, Value>) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Data for an existing resource known only by its stored state
    pub fn from_state(id: impl Into<String>, state: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            config: state.clone(),
            state,
            warnings: Vec::new(),
        }
    }

    /// Data for an existing resource with new desired configuration
    pub fn with_prior(id: impl Into<String>, prior: Map<String, Value>, config: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            config,
            state: prior,
            warnings: Vec::new(),
        }
    }

    /// Keep the stored value of every computed attribute the configuration leaves
    /// unset. Plain optional attributes are not carried, so removing one from the
    /// configuration clears it remotely.
    pub fn carry_computed(mut self, schema: &Schema) -> Self {
        for (name, attribute) in &schema.attributes {
            if !attribute.computed || !matches!(self.config.get(name), None | Some(Value::Null)) {
                continue;
            }

            if let Some(stored) = self.state.get(name).filter(|v| !v.is_null()) {
                self.config.insert(name.clone(), stored.clone());
            }
        }

        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Forget the identifier: the resource no longer exists remotely
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }

    /// Like [`get`](Self::get) but treats zero values (`""`, `false`, `0`, `[]`, `{}`) as unset
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !is_zero(v))
    }

    pub fn get_str(&self, key: &str) -> String {
        self.get(key).map(value_to_string).unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_list(&self, key: &str) -> Vec<Value> {
        self.get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get_list(key).iter().map(value_to_string).collect()
    }

    /// Set semantics: sorted and de-duplicated
    pub fn get_string_set(&self, key: &str) -> Vec<String> {
        normalize_set(self.get_string_list(key))
    }

    pub fn get_map(&self, key: &str) -> Map<String, Value> {
        self.get(key)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the configuration asks for a value different from the stored state.
    /// Scalars compare by their string form, so `2` and `"2"` are the same value.
    pub fn has_change(&self, key: &str) -> bool {
        match self.config.get(key) {
            None | Some(Value::Null) => false,
            Some(desired) => match self.state.get(key) {
                Some(stored) => value_to_string(desired) != value_to_string(stored),
                None => true,
            },
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.state.insert(key.to_string(), value.into());
    }

    pub fn set_string_set(&mut self, key: &str, values: Vec<String>) {
        self.set(key, normalize_set(values));
    }

    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn into_state(self) -> Map<String, Value> {
        self.state
    }

    pub fn add_warning(&mut self, summary: impl Into<String>) {
        self.warnings.push(Diagnostic::warning(summary));
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }
}

/// Zero value in the configuration sense: unset for `get_ok`
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Render a scalar as the string the API expects
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn normalize_set(mut values: Vec<String>) -> Vec<String> {
    values.retain(|v| !v.is_empty());
    values.sort();
    values.dedup();
    values
}
