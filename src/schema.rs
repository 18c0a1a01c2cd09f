//! Declarative schemas shared by flow inputs and outputs.
//!
//! A `Schema` is plain data. `to_json_schema` renders it as a JSON Schema
//! document, which doubles as the provider's constrained-decoding schema and
//! as tool parameter declarations. `validate` compiles that document and
//! reports every violation, not just the first. Unknown fields are ignored
//! so callers can evolve payloads without breaking older flows.

use crate::error::{ValidationError, Violation};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String { min_length: Option<u64>, max_length: Option<u64> },
    Integer { minimum: Option<f64>, maximum: Option<f64> },
    Number { minimum: Option<f64>, maximum: Option<f64> },
    Boolean,
    StringEnum { variants: Vec<String> },
    Array { items: Box<Schema>, min_items: Option<u64>, max_items: Option<u64> },
    Object { fields: Vec<Field> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn required(name: &str, schema: Schema) -> Self {
        Self { name: name.to_string(), schema, required: true, description: None }
    }

    pub fn optional(name: &str, schema: Schema) -> Self {
        Self { name: name.to_string(), schema, required: false, description: None }
    }

    /// Attach a description; the model sees it as a decoding hint.
    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }
}

impl Schema {
    pub fn string() -> Self {
        Schema::String { min_length: None, max_length: None }
    }

    pub fn integer() -> Self {
        Schema::Integer { minimum: None, maximum: None }
    }

    pub fn number() -> Self {
        Schema::Number { minimum: None, maximum: None }
    }

    pub fn boolean() -> Self {
        Schema::Boolean
    }

    pub fn string_enum<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema::StringEnum { variants: variants.into_iter().map(Into::into).collect() }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array { items: Box::new(items), min_items: None, max_items: None }
    }

    pub fn object<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        Schema::Object { fields: fields.into_iter().collect() }
    }

    /// Minimum string length. No effect on non-string schemas.
    pub fn min_length(mut self, n: u64) -> Self {
        if let Schema::String { min_length, .. } = &mut self {
            *min_length = Some(n);
        }
        self
    }

    /// Maximum string length. No effect on non-string schemas.
    pub fn max_length(mut self, n: u64) -> Self {
        if let Schema::String { max_length, .. } = &mut self {
            *max_length = Some(n);
        }
        self
    }

    /// Inclusive numeric bounds. No effect on non-numeric schemas.
    pub fn range(mut self, lo: f64, hi: f64) -> Self {
        match &mut self {
            Schema::Integer { minimum, maximum } | Schema::Number { minimum, maximum } => {
                *minimum = Some(lo);
                *maximum = Some(hi);
            }
            _ => {}
        }
        self
    }

    /// Inclusive lower bound. No effect on non-numeric schemas.
    pub fn minimum(mut self, lo: f64) -> Self {
        match &mut self {
            Schema::Integer { minimum, .. } | Schema::Number { minimum, .. } => {
                *minimum = Some(lo);
            }
            _ => {}
        }
        self
    }

    /// Array length bounds. No effect on non-array schemas.
    pub fn min_items(mut self, n: u64) -> Self {
        if let Schema::Array { min_items, .. } = &mut self {
            *min_items = Some(n);
        }
        self
    }

    pub fn max_items(mut self, n: u64) -> Self {
        if let Schema::Array { max_items, .. } = &mut self {
            *max_items = Some(n);
        }
        self
    }

    /// Render as a JSON Schema document. `additionalProperties` is never
    /// emitted: unknown fields pass validation, and the document stays
    /// accepted by constrained-decoding endpoints.
    pub fn to_json_schema(&self) -> Value {
        let mut doc = Map::new();
        self.write_into(&mut doc);
        Value::Object(doc)
    }

    fn write_into(&self, doc: &mut Map<String, Value>) {
        match self {
            Schema::String { min_length, max_length } => {
                doc.insert("type".into(), json!("string"));
                if let Some(n) = min_length {
                    doc.insert("minLength".into(), json!(n));
                }
                if let Some(n) = max_length {
                    doc.insert("maxLength".into(), json!(n));
                }
            }
            Schema::Integer { minimum, maximum } => {
                doc.insert("type".into(), json!("integer"));
                if let Some(n) = minimum {
                    doc.insert("minimum".into(), number_value(*n));
                }
                if let Some(n) = maximum {
                    doc.insert("maximum".into(), number_value(*n));
                }
            }
            Schema::Number { minimum, maximum } => {
                doc.insert("type".into(), json!("number"));
                if let Some(n) = minimum {
                    doc.insert("minimum".into(), number_value(*n));
                }
                if let Some(n) = maximum {
                    doc.insert("maximum".into(), number_value(*n));
                }
            }
            Schema::Boolean => {
                doc.insert("type".into(), json!("boolean"));
            }
            Schema::StringEnum { variants } => {
                doc.insert("type".into(), json!("string"));
                doc.insert("enum".into(), json!(variants));
            }
            Schema::Array { items, min_items, max_items } => {
                doc.insert("type".into(), json!("array"));
                doc.insert("items".into(), items.to_json_schema());
                if let Some(n) = min_items {
                    doc.insert("minItems".into(), json!(n));
                }
                if let Some(n) = max_items {
                    doc.insert("maxItems".into(), json!(n));
                }
            }
            Schema::Object { fields } => {
                doc.insert("type".into(), json!("object"));
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    let mut prop = field.schema.to_json_schema();
                    if let Some(text) = &field.description {
                        if let Some(obj) = prop.as_object_mut() {
                            obj.insert("description".into(), json!(text));
                        }
                    }
                    properties.insert(field.name.clone(), prop);
                    if field.required {
                        required.push(Value::String(field.name.clone()));
                    }
                }
                doc.insert("properties".into(), Value::Object(properties));
                if !required.is_empty() {
                    doc.insert("required".into(), Value::Array(required));
                }
            }
        }
    }

    /// Validate a value, collecting every violation. Pure: neither the
    /// schema nor the value is changed, so repeat calls agree.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let document = self.to_json_schema();
        let validator = jsonschema::validator_for(&document).map_err(|e| {
            ValidationError::single("/", format!("schema failed to compile: {e}"))
        })?;

        let violations: Vec<Violation> = validator
            .iter_errors(value)
            .map(|err| {
                let path = err.instance_path.to_string();
                Violation {
                    path: if path.is_empty() { "/".to_string() } else { path },
                    message: err.to_string(),
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}
