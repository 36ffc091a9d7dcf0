//! Example synthesis.
//!
//! Walks a resolved, stage-filtered schema tree and produces either a JSON
//! value that satisfies every constraint it inspected, or the full set of
//! reasons no value could be produced. Failures are data, never panics:
//! object synthesis collects failures from all properties instead of
//! stopping at the first, and alternatives are all visited before the
//! aggregate failure is reported. Identical reasons collapse only at the
//! display surface ([`unique_messages`]).

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use crate::lookup::{extend_reference, property_reference, Lookup, LookupResult, Reference};
use crate::schema::{json_type_name, Items, SchemaNode, SchemaObject, SchemaType, TypeSet};
use crate::stage::{should_show_in_stage, Stage};

/// Recursion ceiling for adversarial documents; exceeding it is a reported
/// failure, not a crash.
const MAX_DEPTH: usize = 64;

/// Why a value could not be synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SynthesisErrorKind {
    /// A `$ref` that does not resolve within the loaded document set.
    UnresolvedReference,
    /// A `$ref` pointing outside the loaded document set.
    ExternalReference,
    /// A `$ref` chain that revisits itself.
    CyclicReference,
    /// A schema no value can satisfy.
    UnsatisfiableSchema,
    /// Every `anyOf`/`oneOf` alternative failed.
    NoSynthesizableBranch,
    /// The bounded-recursion ceiling was hit.
    DepthLimitExceeded,
}

/// A single synthesis failure, tied to the schema location it arose from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisError {
    pub kind: SynthesisErrorKind,
    pub message: String,
    /// Reference of the schema node the failure originates from.
    pub origin: String,
}

impl SynthesisError {
    fn new(kind: SynthesisErrorKind, message: impl Into<String>, origin: &str) -> SynthesisError {
        SynthesisError {
            kind,
            message: message.into(),
            origin: origin.to_string(),
        }
    }
}

impl std::fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failure messages deduplicated by text, in first-seen order.
///
/// The computation behind the errors still visited every branch; only the
/// display collapses repeats.
pub fn unique_messages(errors: &[SynthesisError]) -> Vec<&str> {
    let mut seen = HashSet::new();
    errors
        .iter()
        .map(|error| error.message.as_str())
        .filter(|message| seen.insert(*message))
        .collect()
}

/// Synthesize an example value for a schema.
///
/// Returns the value, or the non-empty list of reasons none could be
/// produced. Emitted values satisfy the schema's declared `type`,
/// `required` names and literal constraints (`enum`/`const` are taken
/// verbatim).
pub fn generate_example(
    schema: &SchemaNode,
    lookup: &Lookup,
    stage: Stage,
) -> Result<Value, Vec<SynthesisError>> {
    generate_example_at(schema, lookup, stage, "#")
}

/// Like [`generate_example`], with an explicit origin reference so failure
/// origins point at the right place when synthesis starts below the root.
pub fn generate_example_at(
    schema: &SchemaNode,
    lookup: &Lookup,
    stage: Stage,
    origin: &str,
) -> Result<Value, Vec<SynthesisError>> {
    let mut ctx = Ctx {
        lookup: *lookup,
        stage,
        in_progress: Vec::new(),
    };
    generate(schema, origin, 0, &mut ctx)
}

struct Ctx<'a> {
    lookup: Lookup<'a>,
    stage: Stage,
    /// Canonical references on the current descent path, for cycle breaks.
    in_progress: Vec<String>,
}

fn generate(
    schema: &SchemaNode,
    origin: &str,
    depth: usize,
    ctx: &mut Ctx,
) -> Result<Value, Vec<SynthesisError>> {
    if depth > MAX_DEPTH {
        return Err(vec![SynthesisError::new(
            SynthesisErrorKind::DepthLimitExceeded,
            "The schema nests too deeply to generate an example.",
            origin,
        )]);
    }
    match schema {
        SchemaNode::Boolean(false) => Err(vec![SynthesisError::new(
            SynthesisErrorKind::UnsatisfiableSchema,
            "There is no valid value for this property.",
            origin,
        )]),
        SchemaNode::Boolean(true) => Ok(json!({})),
        SchemaNode::Object(obj) => match obj.reference.as_deref() {
            Some(reference) => generate_reference(reference, origin, depth, ctx),
            None => generate_object(obj, origin, depth, ctx),
        },
    }
}

fn generate_reference(
    reference: &str,
    origin: &str,
    depth: usize,
    ctx: &mut Ctx,
) -> Result<Value, Vec<SynthesisError>> {
    let document = Reference::parse(origin).document().to_string();
    match ctx.lookup.resolve_reference_at(reference, &document) {
        None => Err(vec![SynthesisError::new(
            SynthesisErrorKind::UnresolvedReference,
            format!("The reference {} could not be resolved.", reference),
            origin,
        )]),
        Some(LookupResult::External { reference }) => Err(vec![SynthesisError::new(
            SynthesisErrorKind::ExternalReference,
            format!(
                "{} is an external reference; its schema is not part of the loaded documents.",
                reference
            ),
            origin,
        )]),
        Some(LookupResult::Resolved {
            schema,
            base_reference,
        }) => {
            let canonical = base_reference.unwrap_or_else(|| reference.to_string());
            if ctx.in_progress.iter().any(|seen| seen == &canonical) {
                return Err(vec![SynthesisError::new(
                    SynthesisErrorKind::CyclicReference,
                    format!(
                        "The reference {} is cyclic; an example cannot be generated for it.",
                        canonical
                    ),
                    origin,
                )]);
            }
            ctx.in_progress.push(canonical.clone());
            let result = generate(&schema, &canonical, depth + 1, ctx);
            ctx.in_progress.pop();
            result
        }
    }
}

fn generate_object(
    obj: &SchemaObject,
    origin: &str,
    depth: usize,
    ctx: &mut Ctx,
) -> Result<Value, Vec<SynthesisError>> {
    // Literal constraints are taken verbatim.
    if let Some(value) = &obj.const_value {
        return Ok(value.clone());
    }
    if let Some(values) = &obj.enum_values {
        return match values.first() {
            Some(value) => Ok(value.clone()),
            None => Err(vec![SynthesisError::new(
                SynthesisErrorKind::UnsatisfiableSchema,
                "The enum constraint lists no values.",
                origin,
            )]),
        };
    }

    let has_composites = obj.all_of.is_some() || obj.any_of.is_some() || obj.one_of.is_some();
    if !has_composites {
        if let Some(value) = representative_literal(obj) {
            return Ok(value);
        }
    }

    let mut acc: Option<Piece> = None;
    let mut errors: Vec<SynthesisError> = Vec::new();

    if has_structure(obj) {
        match structural_value(obj, origin, depth, ctx) {
            Ok(value) => {
                acc = Some(Piece {
                    label: "the declared properties".to_string(),
                    value,
                    literal: false,
                });
            }
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    // allOf: every branch must hold, so the branch values are merged and
    // every branch is visited even after a conflict.
    if let Some(branches) = &obj.all_of {
        let all_of_origin = extend_reference(origin, "allOf");
        for (index, branch) in branches.iter().enumerate() {
            let branch_origin = extend_reference(&all_of_origin, &index.to_string());
            let literal = has_literal(branch, origin, ctx);
            match generate(branch, &branch_origin, depth + 1, ctx) {
                Ok(value) => {
                    let piece = Piece {
                        label: format!("allOf branch {}", index + 1),
                        value,
                        literal,
                    };
                    match acc.take() {
                        None => acc = Some(piece),
                        Some(prev) => match merge_pieces(&prev, &piece, origin) {
                            Ok(merged) => acc = Some(merged),
                            Err(conflict) => {
                                errors.push(conflict);
                                acc = Some(prev);
                            }
                        },
                    }
                }
                Err(mut errs) => errors.append(&mut errs),
            }
        }
    }

    // anyOf / oneOf: the first branch that synthesizes wins, in declaration
    // order; when none does, every branch's failure is aggregated.
    for (keyword, branches) in [("anyOf", &obj.any_of), ("oneOf", &obj.one_of)] {
        let Some(branches) = branches else {
            continue;
        };
        let group_origin = extend_reference(origin, keyword);
        let mut branch_errors: Vec<SynthesisError> = Vec::new();
        let mut chosen = false;
        for (index, branch) in branches.iter().enumerate() {
            let branch_origin = extend_reference(&group_origin, &index.to_string());
            let literal = has_literal(branch, origin, ctx);
            match generate(branch, &branch_origin, depth + 1, ctx) {
                Ok(value) => {
                    let piece = Piece {
                        label: format!("{} branch {}", keyword, index + 1),
                        value,
                        literal,
                    };
                    match acc.take() {
                        None => {
                            acc = Some(piece);
                            chosen = true;
                        }
                        Some(prev) => match merge_pieces(&prev, &piece, origin) {
                            Ok(merged) => {
                                acc = Some(merged);
                                chosen = true;
                            }
                            Err(conflict) => {
                                // This branch clashes with what already
                                // holds; record it and try the next one.
                                branch_errors.push(conflict);
                                acc = Some(prev);
                            }
                        },
                    }
                    if chosen {
                        break;
                    }
                }
                Err(mut errs) => branch_errors.append(&mut errs),
            }
        }
        if !chosen {
            branch_errors.push(SynthesisError::new(
                SynthesisErrorKind::NoSynthesizableBranch,
                format!(
                    "None of the {} alternatives could produce an example.",
                    keyword
                ),
                origin,
            ));
            errors.append(&mut branch_errors);
        }
    }

    if obj.not.is_some() && acc.is_none() && errors.is_empty() {
        errors.push(SynthesisError::new(
            SynthesisErrorKind::UnsatisfiableSchema,
            "Cannot synthesize a value satisfying a negative constraint alone.",
            origin,
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    match acc {
        Some(piece) => Ok(piece.value),
        // No constraining keys at all: anything goes, an empty object by
        // convention.
        None => Ok(json!({})),
    }
}

/// Whether the object carries structure of its own, apart from composites.
fn has_structure(obj: &SchemaObject) -> bool {
    obj.schema_type.is_some()
        || obj.properties.is_some()
        || obj.required.as_ref().map_or(false, |r| !r.is_empty())
        || obj.items.is_some()
}

fn structural_value(
    obj: &SchemaObject,
    origin: &str,
    depth: usize,
    ctx: &mut Ctx,
) -> Result<Value, Vec<SynthesisError>> {
    let declared = obj.schema_type.as_ref().and_then(TypeSet::primary);
    let effective = declared.or_else(|| {
        if obj.properties.is_some() || obj.required.as_ref().map_or(false, |r| !r.is_empty()) {
            Some(SchemaType::Object)
        } else if obj.items.is_some() {
            Some(SchemaType::Array)
        } else {
            None
        }
    });
    match effective {
        Some(SchemaType::Object) => object_value(obj, origin, depth, ctx),
        Some(SchemaType::Array) => Ok(array_value(obj, origin, depth, ctx)),
        Some(SchemaType::String) => Ok(json!("example")),
        Some(SchemaType::Number) | Some(SchemaType::Integer) => Ok(json!(0)),
        Some(SchemaType::Boolean) => Ok(json!(true)),
        Some(SchemaType::Null) => Ok(Value::Null),
        None => Ok(json!({})),
    }
}

fn object_value(
    obj: &SchemaObject,
    origin: &str,
    depth: usize,
    ctx: &mut Ctx,
) -> Result<Value, Vec<SynthesisError>> {
    let required: &[String] = obj.required.as_deref().unwrap_or(&[]);
    let mut out = Map::new();
    let mut errors: Vec<SynthesisError> = Vec::new();
    let mut blocked = false;

    if let Some(properties) = &obj.properties {
        for (name, property) in properties.iter() {
            let is_required = required.iter().any(|r| r == name);
            if !is_required && !property_visible(property, origin, ctx) {
                continue;
            }
            let prop_origin = property_reference(origin, name);
            match generate(property, &prop_origin, depth + 1, ctx) {
                Ok(value) => {
                    out.insert(name.to_string(), value);
                }
                Err(errs) => {
                    for mut error in errs {
                        error.message = format!("Property \"{}\": {}", name, error.message);
                        errors.push(error);
                    }
                    if is_required {
                        blocked = true;
                    }
                }
            }
        }
    }

    // A required name without a property definition allows any value.
    for name in required {
        let declared = obj
            .properties
            .as_ref()
            .map_or(false, |props| props.get(name).is_some());
        if !declared && !out.contains_key(name) {
            out.insert(name.clone(), json!({}));
        }
    }

    // patternProperties / additionalProperties are documented, never
    // fabricated into examples.

    if blocked {
        Err(errors)
    } else {
        Ok(Value::Object(out))
    }
}

/// Stage gate for a property entry, checked on the resolved schema, with
/// the un-dereferenced node kept visible when resolution fails.
fn property_visible(property: &SchemaNode, origin: &str, ctx: &mut Ctx) -> bool {
    let document = Reference::parse(origin).document().to_string();
    match ctx.lookup.get_schema_at(property, &document) {
        Some(result) => result
            .schema()
            .map_or(true, |schema| should_show_in_stage(ctx.stage, schema)),
        None => true,
    }
}

fn array_value(obj: &SchemaObject, origin: &str, depth: usize, ctx: &mut Ctx) -> Value {
    let items_origin = extend_reference(origin, "items");
    match &obj.items {
        None => json!([]),
        Some(Items::Single(item)) => match generate(item, &items_origin, depth + 1, ctx) {
            Ok(value) => json!([value]),
            // An empty array still satisfies the declared type.
            Err(_) => json!([]),
        },
        Some(Items::Tuple(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_origin = extend_reference(&items_origin, &index.to_string());
                match generate(item, &item_origin, depth + 1, ctx) {
                    Ok(value) => values.push(value),
                    Err(_) => return json!([]),
                }
            }
            Value::Array(values)
        }
    }
}

/// Author-supplied `default`/`examples` values, used for scalar types when
/// they do not contradict the declared type.
fn representative_literal(obj: &SchemaObject) -> Option<Value> {
    let scalar = matches!(
        obj.schema_type.as_ref().and_then(TypeSet::primary),
        Some(
            SchemaType::String
                | SchemaType::Number
                | SchemaType::Integer
                | SchemaType::Boolean
                | SchemaType::Null
        )
    );
    if !scalar {
        return None;
    }
    let fits = |value: &Value| {
        obj.schema_type
            .as_ref()
            .map_or(true, |types| types.allows_value(value))
    };
    if let Some(value) = &obj.default_value {
        if fits(value) {
            return Some(value.clone());
        }
    }
    obj.examples.as_ref()?.iter().find(|v| fits(v)).cloned()
}

/// Whether a composite branch pins a literal value (`const`/`enum`) once
/// resolved; literal branch values win merges against placeholders.
fn has_literal(branch: &SchemaNode, origin: &str, ctx: &mut Ctx) -> bool {
    let document = Reference::parse(origin).document().to_string();
    match ctx.lookup.get_schema_at(branch, &document) {
        Some(result) => result
            .schema()
            .and_then(SchemaNode::as_object)
            .map_or(false, |obj| {
                obj.const_value.is_some() || obj.enum_values.is_some()
            }),
        None => false,
    }
}

#[derive(Debug, Clone)]
struct Piece {
    label: String,
    value: Value,
    literal: bool,
}

/// Merge two branch examples. Objects union key-wise (recursively, first
/// value winning), equal values collapse, a literal value wins over a
/// placeholder of the same type, and differing JSON types are a structural
/// conflict naming both branches.
fn merge_pieces(a: &Piece, b: &Piece, origin: &str) -> Result<Piece, SynthesisError> {
    match (&a.value, &b.value) {
        (Value::Object(left), Value::Object(right)) => Ok(Piece {
            label: a.label.clone(),
            value: Value::Object(union_objects(left, right)),
            literal: a.literal || b.literal,
        }),
        (left, right) if left == right => Ok(a.clone()),
        (left, right) if json_type_name(left) == json_type_name(right) => {
            if a.literal && b.literal {
                Err(SynthesisError::new(
                    SynthesisErrorKind::UnsatisfiableSchema,
                    format!(
                        "{} and {} require conflicting literal values.",
                        a.label, b.label
                    ),
                    origin,
                ))
            } else if b.literal {
                Ok(b.clone())
            } else {
                Ok(a.clone())
            }
        }
        (left, right) => Err(SynthesisError::new(
            SynthesisErrorKind::UnsatisfiableSchema,
            format!(
                "{} produces a {} value but {} produces a {} value; the branches cannot both hold.",
                a.label,
                json_type_name(left),
                b.label,
                json_type_name(right)
            ),
            origin,
        )),
    }
}

fn union_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = left.clone();
    for (key, value) in right {
        let replacement = match (merged.get(key), value) {
            (Some(Value::Object(a)), Value::Object(b)) => Some(Value::Object(union_objects(a, b))),
            (Some(_), _) => None,
            (None, v) => Some(v.clone()),
        };
        if let Some(v) = replacement {
            merged.insert(key.clone(), v);
        }
    }
    merged
}
