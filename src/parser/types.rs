use serde::Serialize;

/// Name of the marker element a failed parse leaves behind
pub const PARSER_ERROR_TAG: &str = "parsererror";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Qualified name exactly as written, prefix included
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    /// Left in place of content the parser could not read
    ParserError(String),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whether this node or any descendant is a parser-error marker
    fn contains_parser_error(&self) -> bool {
        match self {
            Node::ParserError(_) => true,
            Node::Element(element) => element.children.iter().any(Node::contains_parser_error),
            Node::Text(_) | Node::Comment(_) => false,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Tree form of one fetched XML text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Document standing in for text that could not be parsed
    pub fn parser_error(message: impl Into<String>) -> Self {
        Self {
            children: vec![Node::ParserError(message.into())],
        }
    }

    /// Validity check: a document is well-formed when the parser left no
    /// error marker anywhere in the tree.
    pub fn is_well_formed(&self) -> bool {
        !self.children.iter().any(Node::contains_parser_error)
    }

    /// Message of the first parser-error marker, if any
    pub fn parser_error_message(&self) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            Node::ParserError(message) => Some(message.as_str()),
            _ => None,
        })
    }

    /// Every element named `tag`, in document order
    pub fn elements_named<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_named(&self.children, tag, &mut found);
        found
    }

    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }
}

fn collect_named<'a>(nodes: &'a [Node], tag: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.name == tag {
                found.push(element);
            }
            collect_named(&element.children, tag, found);
        }
    }
}
