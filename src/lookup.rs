//! Reference lookup over an immutable document set.
//!
//! A [`DocumentSet`] is built once per load and never mutated; [`Lookup`]
//! is a pure resolution facade over it. Resolving the same reference twice
//! against the same set yields structurally identical results.
//!
//! References have the form `document#/json/pointer`. An empty document
//! half addresses the root document; a document half naming something the
//! set does not hold is an external reference, which is linkable but never
//! dereferenced.

use std::collections::HashSet;

use serde_json::Value;

use crate::schema::SchemaNode;

/// Immutable index of loaded schema documents: one root plus any number of
/// imported documents keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    root: Value,
    imports: Vec<(String, Value)>,
}

impl DocumentSet {
    pub fn new(root: Value) -> DocumentSet {
        DocumentSet {
            root,
            imports: Vec::new(),
        }
    }

    /// Add an imported document under the name references use for it.
    pub fn with_import(mut self, name: impl Into<String>, document: Value) -> DocumentSet {
        self.insert(name, document);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        self.imports.push((name.into(), document));
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Document by name; the empty name addresses the root document.
    pub fn document(&self, name: &str) -> Option<&Value> {
        if name.is_empty() {
            return Some(&self.root);
        }
        self.imports
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, document)| document)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.document(name).is_some()
    }
}

/// A reference split into its document and JSON Pointer halves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    document: String,
    pointer: String,
}

impl Reference {
    /// Parse a raw reference string. `#/a/b` addresses the root document,
    /// `types.json#/a` an imported or external one, and a bare `types.json`
    /// a whole document.
    pub fn parse(raw: &str) -> Reference {
        match raw.find('#') {
            Some(idx) => Reference {
                document: raw[..idx].to_string(),
                pointer: normalize_pointer(&raw[idx + 1..]),
            },
            None => Reference {
                document: raw.to_string(),
                pointer: String::new(),
            },
        }
    }

    /// The document half; empty means the root document.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// The pointer half, empty or starting with `/`.
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Canonical string form: `#/ptr` for the root document, `doc#/ptr`
    /// otherwise.
    pub fn canonical(&self) -> String {
        format!("{}#{}", self.document, self.pointer)
    }

    /// Resolve a document-less reference against the document it was found
    /// in: a bare `#/a` inside `types.json` means `types.json#/a`.
    #[must_use]
    pub fn rebase(mut self, document: &str) -> Reference {
        if self.document.is_empty() && !document.is_empty() {
            self.document = document.to_string();
        }
        self
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn normalize_pointer(pointer: &str) -> String {
    if pointer.is_empty() || pointer == "/" {
        String::new()
    } else if pointer.starts_with('/') {
        pointer.to_string()
    } else {
        format!("/{}", pointer)
    }
}

/// Result of dereferencing a schema fragment or reference string.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    /// Target found inside the document set, dereferenced one level (nested
    /// `$ref`s are not expanded).
    Resolved {
        schema: SchemaNode,
        /// Canonical de-aliased reference of the target; `None` when the
        /// input was an anonymous node rather than a `$ref`, in which case
        /// callers derive a structural origin (see [`property_reference`]).
        base_reference: Option<String>,
    },
    /// Reference pointing outside the loaded document set. The body is not
    /// available; only the link is.
    External { reference: String },
}

impl LookupResult {
    pub fn is_external(&self) -> bool {
        matches!(self, LookupResult::External { .. })
    }

    /// The resolved schema, when there is one.
    pub fn schema(&self) -> Option<&SchemaNode> {
        match self {
            LookupResult::Resolved { schema, .. } => Some(schema),
            LookupResult::External { .. } => None,
        }
    }

    pub fn base_reference(&self) -> Option<&str> {
        match self {
            LookupResult::Resolved { base_reference, .. } => base_reference.as_deref(),
            LookupResult::External { reference } => Some(reference),
        }
    }
}

/// Pure resolution facade over a [`DocumentSet`]. Holds no state of its
/// own and performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    documents: &'a DocumentSet,
}

impl<'a> Lookup<'a> {
    pub fn new(documents: &'a DocumentSet) -> Lookup<'a> {
        Lookup { documents }
    }

    /// Dereference a schema node: `$ref` nodes resolve against the document
    /// set, anything else is returned unchanged with no base reference.
    ///
    /// Returns `None` when a reference does not resolve; callers fall back
    /// to the un-dereferenced node.
    pub fn get_schema(&self, schema: &SchemaNode) -> Option<LookupResult> {
        self.get_schema_at(schema, "")
    }

    /// Like [`Lookup::get_schema`], for a node found inside the named
    /// document, so document-less `$ref`s resolve against that document.
    pub fn get_schema_at(&self, schema: &SchemaNode, document: &str) -> Option<LookupResult> {
        match schema.reference() {
            Some(reference) => self.resolve_reference_at(reference, document),
            None => Some(LookupResult::Resolved {
                schema: schema.clone(),
                base_reference: None,
            }),
        }
    }

    /// Resolve a reference string against the root document.
    pub fn resolve_reference(&self, reference: &str) -> Option<LookupResult> {
        self.resolve_reference_at(reference, "")
    }

    /// Resolve a reference string found inside the named document.
    ///
    /// Chains of `$ref` collapse to their final target; the result's base
    /// reference is the canonical, de-aliased one. A chain that revisits a
    /// reference without reaching a concrete node is a cycle and resolves
    /// to `None`. Resolution iterates instead of recursing, so adversarial
    /// chains cannot overflow the stack.
    pub fn resolve_reference_at(&self, reference: &str, document: &str) -> Option<LookupResult> {
        let mut current = Reference::parse(reference).rebase(document);
        let mut visited: HashSet<Reference> = HashSet::new();
        loop {
            if self.is_external(&current) {
                return Some(LookupResult::External {
                    reference: current.canonical(),
                });
            }
            if !visited.insert(current.clone()) {
                return None;
            }
            let raw = self.fragment(&current)?;
            let node = SchemaNode::from_value(raw).ok()?;
            match node.reference() {
                Some(next) => {
                    let document = current.document().to_string();
                    current = Reference::parse(next).rebase(&document);
                }
                None => {
                    return Some(LookupResult::Resolved {
                        schema: node,
                        base_reference: Some(current.canonical()),
                    });
                }
            }
        }
    }

    /// Raw JSON of the fragment a reference addresses, for display.
    pub fn raw_fragment(&self, reference: &str) -> Option<&Value> {
        self.fragment(&Reference::parse(reference))
    }

    /// Whether a reference string points outside the loaded document set.
    pub fn is_external_reference(&self, reference: &str) -> bool {
        self.is_external(&Reference::parse(reference))
    }

    fn is_external(&self, reference: &Reference) -> bool {
        !reference.document().is_empty() && !self.documents.contains(reference.document())
    }

    fn fragment(&self, reference: &Reference) -> Option<&Value> {
        let document = self.documents.document(reference.document())?;
        navigate(document, reference.pointer())
    }
}

/// Walk a JSON Pointer within a document.
fn navigate<'v>(document: &'v Value, pointer: &str) -> Option<&'v Value> {
    if pointer.is_empty() {
        return Some(document);
    }
    let mut current = document;
    for part in pointer.trim_start_matches('/').split('/') {
        // JSON Pointer unescape (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Escape a segment for use in a JSON Pointer.
fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Append one pointer segment to a reference.
pub fn extend_reference(reference: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        reference.trim_end_matches('/'),
        escape_segment(segment)
    )
}

/// Structural origin of a named property of the schema at `reference`,
/// used when a lookup yields no base reference of its own.
pub fn property_reference(reference: &str, name: &str) -> String {
    extend_reference(&extend_reference(reference, "properties"), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_parse_root_fragment() {
        let reference = Reference::parse("#/definitions/item");
        assert_eq!(reference.document(), "");
        assert_eq!(reference.pointer(), "/definitions/item");
        assert_eq!(reference.canonical(), "#/definitions/item");
    }

    #[test]
    fn reference_parse_document_fragment() {
        let reference = Reference::parse("types.json#/defs/size");
        assert_eq!(reference.document(), "types.json");
        assert_eq!(reference.canonical(), "types.json#/defs/size");
    }

    #[test]
    fn reference_parse_bare_document() {
        let reference = Reference::parse("types.json");
        assert_eq!(reference.document(), "types.json");
        assert_eq!(reference.pointer(), "");
        assert_eq!(reference.canonical(), "types.json#");
    }

    #[test]
    fn reference_root_forms_normalize() {
        assert_eq!(Reference::parse("#").canonical(), "#");
        assert_eq!(Reference::parse("#/").canonical(), "#");
    }

    #[test]
    fn reference_rebase_applies_only_to_document_less_refs() {
        let bare = Reference::parse("#/a").rebase("types.json");
        assert_eq!(bare.canonical(), "types.json#/a");

        let qualified = Reference::parse("other.json#/a").rebase("types.json");
        assert_eq!(qualified.canonical(), "other.json#/a");
    }

    #[test]
    fn navigate_objects_and_arrays() {
        let document = json!({ "a": { "b": [ { "c": 1 } ] } });
        assert_eq!(navigate(&document, "/a/b/0/c"), Some(&json!(1)));
        assert_eq!(navigate(&document, "/a/missing"), None);
        assert_eq!(navigate(&document, "/a/b/7"), None);
        assert_eq!(navigate(&document, ""), Some(&document));
    }

    #[test]
    fn navigate_unescapes_pointer_tokens() {
        let document = json!({ "a/b": { "x~y": 2 } });
        assert_eq!(navigate(&document, "/a~1b/x~0y"), Some(&json!(2)));
    }

    #[test]
    fn extend_reference_escapes_segments() {
        assert_eq!(extend_reference("#", "items"), "#/items");
        assert_eq!(extend_reference("#/", "items"), "#/items");
        assert_eq!(extend_reference("#/a", "x/y"), "#/a/x~1y");
        assert_eq!(
            property_reference("#/definitions/item", "name"),
            "#/definitions/item/properties/name"
        );
    }

    #[test]
    fn document_set_resolves_names() {
        let set = DocumentSet::new(json!({"root": true}))
            .with_import("types.json", json!({"imported": true}));
        assert_eq!(set.document(""), Some(&json!({"root": true})));
        assert_eq!(set.document("types.json"), Some(&json!({"imported": true})));
        assert_eq!(set.document("other.json"), None);
        assert!(set.contains(""));
        assert!(!set.contains("other.json"));
    }

    #[test]
    fn malformed_fragment_resolves_to_none() {
        // The fragment exists but is not a schema shape.
        let set = DocumentSet::new(json!({ "definitions": { "broken": 42 } }));
        let lookup = Lookup::new(&set);
        assert!(lookup.resolve_reference("#/definitions/broken").is_none());
    }
}
