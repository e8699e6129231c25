use crate::error::DiagramParseError;

/// Handle to an element of a `DiagramTree`. Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(usize);

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// An owned, read-only element tree of one diagram document.
///
/// Elements are stored in document order, so every query that returns several
/// nodes returns them in document order.
#[derive(Debug, Clone)]
pub struct DiagramTree {
    elements: Vec<Element>,
}

impl DiagramTree {
    pub fn parse(xml: &str) -> Result<Self, DiagramParseError> {
        let document = roxmltree::Document::parse(xml)?;
        let mut elements = Vec::new();
        Self::collect(document.root_element(), None, &mut elements);
        Ok(Self { elements })
    }

    /// Flattens the element subtree into `elements` in pre-order.
    fn collect(
        node: roxmltree::Node<'_, '_>,
        parent: Option<usize>,
        elements: &mut Vec<Element>,
    ) {
        let index = elements.len();
        let text: String = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();
        elements.push(Element {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            elements[parent].children.push(index);
        }
        for child in node.children().filter(|child| child.is_element()) {
            Self::collect(child, Some(index), elements);
        }
    }

    pub fn root(&self) -> NodeRef {
        NodeRef(0)
    }

    pub fn kind(&self, node: NodeRef) -> &str {
        &self.elements[node.0].name
    }

    pub fn attribute(&self, node: NodeRef, name: &str) -> Option<&str> {
        self.elements[node.0]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of the element and all of its descendants.
    pub fn text_content(&self, node: NodeRef) -> String {
        let mut out = self.elements[node.0].text.clone();
        for &child in &self.elements[node.0].children {
            out.push_str(&self.text_content(NodeRef(child)));
        }
        out
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.elements[node.0].parent.map(NodeRef)
    }

    /// Strict descendants of `scope` in document order.
    pub fn descendants(&self, scope: NodeRef) -> impl Iterator<Item = NodeRef> + '_ {
        let mut stack: Vec<usize> = self.elements[scope.0].children.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(self.elements[next].children.iter().rev().copied());
            Some(NodeRef(next))
        })
    }

    /// Elements of `kind` whose `attribute` ends with `suffix`.
    pub fn find_by_attribute_suffix(
        &self,
        kind: &str,
        attribute: &str,
        suffix: &str,
    ) -> Vec<NodeRef> {
        (0..self.elements.len())
            .map(NodeRef)
            .filter(|&node| self.kind(node) == kind)
            .filter(|&node| {
                self.attribute(node, attribute)
                    .is_some_and(|value| value.ends_with(suffix))
            })
            .collect()
    }

    /// Descendants of `scope` matching the descendant-combinator `path`
    /// (e.g. `["portIdentifier", "portId"]`) whose text content contains `needle`.
    pub fn find_by_contained_text(
        &self,
        scope: NodeRef,
        path: &[&str],
        needle: &str,
    ) -> Vec<NodeRef> {
        self.select(scope, path)
            .into_iter()
            .filter(|&node| self.text_content(node).contains(needle))
            .collect()
    }

    /// The nearest strict ancestor of `node` of the given kind.
    pub fn nearest_ancestor_of_kind(&self, node: NodeRef, kind: &str) -> Option<NodeRef> {
        let mut current = self.parent(node);
        while let Some(candidate) = current {
            if self.kind(candidate) == kind {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// `node` itself if it is of `kind`, otherwise its nearest ancestor of that kind.
    pub fn closest(&self, node: NodeRef, kind: &str) -> Option<NodeRef> {
        if self.kind(node) == kind {
            Some(node)
        } else {
            self.nearest_ancestor_of_kind(node, kind)
        }
    }

    pub fn has_path(&self, scope: NodeRef, path: &[&str]) -> bool {
        !self.select(scope, path).is_empty()
    }

    /// Number of elements of `kind` in the whole document.
    pub fn count(&self, kind: &str) -> usize {
        self.elements.iter().filter(|e| e.name == kind).count()
    }

    /// Descendants of `scope` whose kind is the last path segment and whose
    /// ancestors, up to and including `scope`, contain the earlier segments in order.
    fn select(&self, scope: NodeRef, path: &[&str]) -> Vec<NodeRef> {
        let Some((last, ancestors)) = path.split_last() else {
            return Vec::new();
        };
        self.descendants(scope)
            .filter(|&node| self.kind(node) == *last)
            .filter(|&node| self.ancestors_match(node, scope, ancestors))
            .collect()
    }

    fn ancestors_match(&self, node: NodeRef, scope: NodeRef, path: &[&str]) -> bool {
        let mut remaining = path.iter().rev().peekable();
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            if remaining.peek().is_some_and(|&&kind| self.kind(ancestor) == kind) {
                remaining.next();
            }
            if remaining.peek().is_none() || ancestor == scope {
                break;
            }
            current = self.parent(ancestor);
        }
        remaining.peek().is_none()
    }
}
