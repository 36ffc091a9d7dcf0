//! Schema Atlas
//!
//! Reference resolution and example synthesis for JSON Schema
//! documentation.
//!
//! Given a loaded set of schema documents, this library resolves `$ref`
//! pointers to their canonical targets (collapsing chains, flagging
//! external references and breaking cycles), filters property visibility
//! by release stage, derives human-readable titles, models the user's
//! drill-down trail, and synthesizes example payloads that satisfy the
//! schema they came from, or explains precisely why none could be
//! produced.
//!
//! The core is pure and synchronous: documents are loaded once into an
//! immutable [`DocumentSet`] and nothing downstream mutates shared state.
//!
//! # Example
//!
//! ```
//! use schema_atlas::{generate_example, DocumentSet, Lookup, Stage};
//! use serde_json::json;
//!
//! let document = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": { "type": "string", "enum": ["widget"] },
//!         "size": { "$ref": "#/definitions/size" }
//!     },
//!     "definitions": {
//!         "size": { "type": "integer", "x-stage": "beta" }
//!     }
//! });
//!
//! let documents = DocumentSet::new(document);
//! let lookup = Lookup::new(&documents);
//!
//! let root = lookup.resolve_reference("#").unwrap();
//! let example = generate_example(root.schema().unwrap(), &lookup, Stage::Stable).unwrap();
//! assert_eq!(example, json!({ "name": "widget", "size": 0 }));
//!
//! // The same schema viewed at the draft stage hides the beta property.
//! let example = generate_example(root.schema().unwrap(), &lookup, Stage::Draft).unwrap();
//! assert_eq!(example, json!({ "name": "widget" }));
//! ```

mod error;
mod example;
mod loader;
mod lookup;
mod path;
mod schema;
mod stage;
mod title;
mod validator;

pub use error::{LoadError, ValidateError, ValidationMarker};
pub use example::{
    generate_example, generate_example_at, unique_messages, SynthesisError, SynthesisErrorKind,
};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, load_document_yaml_str,
};
pub use lookup::{
    extend_reference, property_reference, DocumentSet, Lookup, LookupResult, Reference,
};
pub use path::{NavigationPath, PathElement};
pub use schema::{json_type_name, Items, SchemaMap, SchemaNode, SchemaObject, SchemaType, TypeSet};
pub use stage::{should_show_in_stage, Stage};
pub use title::{find_title, resolve_title};
pub use validator::{collect_markers, validate_instance};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
