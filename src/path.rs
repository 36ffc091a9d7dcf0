//! Navigation path model for drill-down trails.
//!
//! A path records how the user reached the current schema node, root first.
//! Paths are immutable: navigation returns a new path and never mutates a
//! shared one, so the presentation layer can keep old paths around for
//! history and back buttons.

use serde::Serialize;

/// One step of the trail: where the step points and what to call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathElement {
    pub reference: String,
    pub title: String,
}

impl PathElement {
    pub fn new(reference: impl Into<String>, title: impl Into<String>) -> PathElement {
        PathElement {
            reference: reference.into(),
            title: title.into(),
        }
    }
}

/// Ordered drill-down trail, root first, current node last. Never empty.
///
/// Invariant maintained by callers: each appended reference is reachable
/// from the previous element's schema by one property or `$ref` hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationPath {
    elements: Vec<PathElement>,
}

impl NavigationPath {
    /// A fresh path rooted at the given element. The root is fixed for the
    /// lifetime of the path and everything derived from it.
    pub fn new(root: PathElement) -> NavigationPath {
        NavigationPath {
            elements: vec![root],
        }
    }

    pub fn root(&self) -> &PathElement {
        &self.elements[0]
    }

    /// The element the user is currently looking at.
    pub fn current(&self) -> &PathElement {
        &self.elements[self.elements.len() - 1]
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// Number of steps in the trail, root included.
    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn is_root(&self) -> bool {
        self.elements.len() == 1
    }

    /// A new path with one more step appended.
    #[must_use]
    pub fn advance(&self, reference: impl Into<String>, title: impl Into<String>) -> NavigationPath {
        let mut elements = self.elements.clone();
        elements.push(PathElement::new(reference, title));
        NavigationPath { elements }
    }

    /// A new path with the last step dropped. Retreating from the root is a
    /// no-op, not an error: the same single-element path comes back.
    #[must_use]
    pub fn retreat(&self) -> NavigationPath {
        if self.is_root() {
            return self.clone();
        }
        NavigationPath {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        }
    }

    /// The ordered references of the trail, for the routing layer.
    pub fn to_link_segments(&self) -> Vec<&str> {
        self.elements
            .iter()
            .map(|element| element.reference.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_path() -> NavigationPath {
        NavigationPath::new(PathElement::new("#/", "Root"))
    }

    #[test]
    fn retreat_on_root_is_a_no_op() {
        let path = root_path();
        assert_eq!(path.retreat(), path);
        assert_eq!(path.retreat().depth(), 1);
    }

    #[test]
    fn retreat_undoes_advance() {
        let path = root_path();
        let deeper = path.advance("#/properties/item", "Item");
        assert_eq!(deeper.retreat(), path);

        let deepest = deeper.advance("#/definitions/size", "Size");
        assert_eq!(deepest.retreat(), deeper);
        assert_eq!(deepest.retreat().retreat(), path);
    }

    #[test]
    fn advance_does_not_mutate_the_original() {
        let path = root_path();
        let _ = path.advance("#/properties/item", "Item");
        assert_eq!(path.depth(), 1);
        assert_eq!(path.current().title, "Root");
    }

    #[test]
    fn root_is_fixed_across_navigation() {
        let path = root_path()
            .advance("#/properties/a", "A")
            .advance("#/properties/b", "B");
        assert_eq!(path.root(), &PathElement::new("#/", "Root"));
        assert_eq!(path.current(), &PathElement::new("#/properties/b", "B"));
    }

    #[test]
    fn link_segments_are_ordered_references() {
        let path = root_path()
            .advance("#/properties/item", "Item")
            .advance("#/definitions/size", "Size");
        assert_eq!(
            path.to_link_segments(),
            vec!["#/", "#/properties/item", "#/definitions/size"]
        );
    }

    #[test]
    fn serializes_as_element_list() {
        let path = root_path().advance("#/properties/item", "Item");
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "reference": "#/", "title": "Root" },
                { "reference": "#/properties/item", "title": "Item" }
            ])
        );
    }
}
