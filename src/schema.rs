//! Schema node data model.
//!
//! Fragments of a JSON Schema document are parsed once into a tagged union
//! instead of being probed for shape at every use site. A node is either a
//! boolean schema or an object schema; `additionalProperties` reuses the
//! same union, so its boolean form falls out of the parse for free.
//!
//! Unknown JSON Schema keywords are ignored. Property maps keep insertion
//! order (serde_json's `preserve_order`) so rendering and synthesis are
//! deterministic.

use serde::Deserialize;
use serde_json::Value;

use crate::stage::Stage;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A schema fragment: either a boolean schema or an object schema.
///
/// `true` allows any value, `false` allows none.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    Boolean(bool),
    Object(Box<SchemaObject>),
}

impl SchemaNode {
    /// Parse a raw JSON value into a schema node.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the value is not a boolean or an object
    /// with recognizable schema keywords.
    pub fn from_value(value: &Value) -> Result<SchemaNode, serde_json::Error> {
        serde_json::from_value(value.clone())
    }

    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            SchemaNode::Object(obj) => Some(obj),
            SchemaNode::Boolean(_) => None,
        }
    }

    /// The `$ref` carried by this node, if any.
    pub fn reference(&self) -> Option<&str> {
        self.as_object().and_then(|obj| obj.reference.as_deref())
    }

    /// True when the node places no constraint on values.
    pub fn is_unconstrained(&self) -> bool {
        match self {
            SchemaNode::Boolean(allowed) => *allowed,
            SchemaNode::Object(obj) => obj.is_unconstrained(),
        }
    }
}

/// An object schema with the keywords the engine understands.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SchemaObject {
    #[serde(rename = "type")]
    pub schema_type: Option<TypeSet>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub properties: Option<SchemaMap>,
    pub required: Option<Vec<String>>,
    #[serde(rename = "additionalProperties")]
    pub additional_properties: Option<Box<SchemaNode>>,
    #[serde(rename = "patternProperties")]
    pub pattern_properties: Option<SchemaMap>,
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<SchemaNode>>,
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<SchemaNode>>,
    #[serde(rename = "oneOf")]
    pub one_of: Option<Vec<SchemaNode>>,
    pub not: Option<Box<SchemaNode>>,
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "const")]
    pub const_value: Option<Value>,
    #[serde(rename = "default")]
    pub default_value: Option<Value>,
    pub examples: Option<Vec<Value>>,
    pub items: Option<Items>,
    /// Release-stage marker, carried on the `x-stage` convention key.
    #[serde(rename = "x-stage")]
    pub stage: Option<Stage>,
}

impl SchemaObject {
    /// True when none of the constraining keywords are present.
    ///
    /// Annotations (`title`, `description`, `default`, `examples`,
    /// `x-stage`) do not constrain values.
    pub fn is_unconstrained(&self) -> bool {
        self.schema_type.is_none()
            && self.properties.is_none()
            && self.required.as_ref().map_or(true, |r| r.is_empty())
            && self.additional_properties.is_none()
            && self.pattern_properties.is_none()
            && self.all_of.is_none()
            && self.any_of.is_none()
            && self.one_of.is_none()
            && self.not.is_none()
            && self.reference.is_none()
            && self.enum_values.is_none()
            && self.const_value.is_none()
            && self.items.is_none()
    }
}

/// The `type` keyword: a single type name or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    One(SchemaType),
    Many(Vec<SchemaType>),
}

impl TypeSet {
    /// The type synthesis should aim for: the single type, or the first of
    /// a list (any listed type satisfies the declaration).
    pub fn primary(&self) -> Option<SchemaType> {
        match self {
            TypeSet::One(t) => Some(*t),
            TypeSet::Many(ts) => ts.first().copied(),
        }
    }

    /// Whether a concrete JSON value satisfies this type declaration.
    pub fn allows_value(&self, value: &Value) -> bool {
        match self {
            TypeSet::One(t) => t.matches_value(value),
            TypeSet::Many(ts) => ts.iter().any(|t| t.matches_value(value)),
        }
    }
}

impl std::fmt::Display for TypeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeSet::One(t) => write!(f, "{}", t),
            TypeSet::Many(ts) => {
                let names: Vec<&str> = ts.iter().map(|t| t.name()).collect();
                write!(f, "{}", names.join(" | "))
            }
        }
    }
}

/// The primitive JSON Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl SchemaType {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::String => "string",
        }
    }

    /// Whether a concrete JSON value has this type. Whole numbers satisfy
    /// both `integer` and `number`.
    pub fn matches_value(&self, value: &Value) -> bool {
        match self {
            SchemaType::Null => value.is_null(),
            SchemaType::Boolean => value.is_boolean(),
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::Number => value.is_number(),
            SchemaType::Integer => {
                value.as_i64().is_some()
                    || value.as_u64().is_some()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            SchemaType::String => value.is_string(),
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The `items` keyword: one schema for all elements, or a tuple of
/// positional schemas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Single(Box<SchemaNode>),
    Tuple(Vec<SchemaNode>),
}

/// Ordered map of name to schema node, insertion order preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaMap(Vec<(String, SchemaNode)>);

impl SchemaMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.0
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SchemaMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let node = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
            entries.push((name, node));
        }
        Ok(SchemaMap(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_schemas_parse() {
        assert_eq!(
            SchemaNode::from_value(&json!(true)).unwrap(),
            SchemaNode::Boolean(true)
        );
        assert_eq!(
            SchemaNode::from_value(&json!(false)).unwrap(),
            SchemaNode::Boolean(false)
        );
    }

    #[test]
    fn object_schema_parses_known_keywords() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "title": "Widget",
            "required": ["name"],
            "properties": {
                "name": { "type": "string" },
                "size": { "$ref": "#/definitions/size" }
            },
            "x-stage": "beta"
        }))
        .unwrap();

        let obj = node.as_object().unwrap();
        assert_eq!(obj.schema_type, Some(TypeSet::One(SchemaType::Object)));
        assert_eq!(obj.title.as_deref(), Some("Widget"));
        assert_eq!(obj.stage, Some(Stage::Beta));

        let props = obj.properties.as_ref().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(
            props.get("size").unwrap().reference(),
            Some("#/definitions/size")
        );
    }

    #[test]
    fn property_order_is_preserved() {
        let node = SchemaNode::from_value(&json!({
            "properties": {
                "zulu": {},
                "alpha": {},
                "mike": {}
            }
        }))
        .unwrap();

        let names: Vec<&str> = node
            .as_object()
            .unwrap()
            .properties
            .as_ref()
            .unwrap()
            .iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let node = SchemaNode::from_value(&json!({
            "type": "string",
            "minLength": 3,
            "format": "uri"
        }))
        .unwrap();
        assert!(node.as_object().is_some());
    }

    #[test]
    fn non_schema_values_fail_to_parse() {
        assert!(SchemaNode::from_value(&json!(42)).is_err());
        assert!(SchemaNode::from_value(&json!("string")).is_err());
    }

    #[test]
    fn unconstrained_detection() {
        let empty = SchemaNode::from_value(&json!({})).unwrap();
        assert!(empty.is_unconstrained());

        let annotated =
            SchemaNode::from_value(&json!({ "title": "T", "description": "d" })).unwrap();
        assert!(annotated.is_unconstrained());

        let typed = SchemaNode::from_value(&json!({ "type": "string" })).unwrap();
        assert!(!typed.is_unconstrained());

        assert!(SchemaNode::Boolean(true).is_unconstrained());
        assert!(!SchemaNode::Boolean(false).is_unconstrained());
    }

    #[test]
    fn type_list_parses_and_reports_primary() {
        let node = SchemaNode::from_value(&json!({ "type": ["string", "null"] })).unwrap();
        let types = node.as_object().unwrap().schema_type.as_ref().unwrap();
        assert_eq!(types.primary(), Some(SchemaType::String));
        assert!(types.allows_value(&json!("x")));
        assert!(types.allows_value(&json!(null)));
        assert!(!types.allows_value(&json!(3)));
    }

    #[test]
    fn integer_matches_whole_numbers_only() {
        assert!(SchemaType::Integer.matches_value(&json!(3)));
        assert!(SchemaType::Integer.matches_value(&json!(3.0)));
        assert!(!SchemaType::Integer.matches_value(&json!(3.5)));
        assert!(SchemaType::Number.matches_value(&json!(3.5)));
    }

    #[test]
    fn tuple_items_parse() {
        let node = SchemaNode::from_value(&json!({
            "type": "array",
            "items": [{ "type": "string" }, { "type": "integer" }]
        }))
        .unwrap();
        match node.as_object().unwrap().items.as_ref().unwrap() {
            Items::Tuple(items) => assert_eq!(items.len(), 2),
            Items::Single(_) => panic!("expected tuple items"),
        }
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1)), "number");
        assert_eq!(json_type_name(&json!("s")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
