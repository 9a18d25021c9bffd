use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::parser::error::{Result, XmlError};
use crate::parser::rules::{
    attributes_are_separated, check_chars, check_comment, check_name, check_qname, prefix_of,
};
use crate::parser::types::*;

/// Nesting limit applied when no explicit one is configured
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Largest nesting limit that may be configured
pub const MAX_DEPTH_LIMIT: usize = 4096;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest element nesting accepted before the text is rejected
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse `text` into a document, failing on the first well-formedness error.
pub fn try_parse(text: &str, options: &ParseOptions) -> Result<Document> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    TreeBuilder::new(text, options).build()
}

/// Parse `text` into a document without ever failing.
///
/// Text that is not well-formed yields a document whose only child is a
/// parser-error marker, so [`Document::is_well_formed`] reports it as invalid.
pub fn parse_document(text: &str, options: &ParseOptions) -> Document {
    match try_parse(text, options) {
        Ok(document) => document,
        Err(err) => {
            debug!(error = %err, bytes = text.len(), "XML text is not well-formed");
            Document::parser_error(err.to_string())
        }
    }
}

// Builds the tree from quick-xml events
struct TreeBuilder<'a> {
    reader: Reader<&'a [u8]>,
    max_depth: usize,

    /// Elements opened but not yet closed, innermost last
    stack: Vec<Element>,

    /// Namespace prefixes declared on each open element, parallel to `stack`
    scopes: Vec<Vec<String>>,

    /// Children of the document itself
    top_level: Vec<Node>,

    started: bool,
    root_seen: bool,
    doctype_seen: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(text: &'a str, options: &ParseOptions) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        reader.config_mut().check_end_names = true;

        Self {
            reader,
            max_depth: options.max_depth,
            stack: Vec::new(),
            scopes: Vec::new(),
            top_level: Vec::new(),
            started: false,
            root_seen: false,
            doctype_seen: false,
        }
    }

    fn build(mut self) -> Result<Document> {
        loop {
            let event = self.reader.read_event().map_err(|err| XmlError::Syntax {
                message: err.to_string(),
                position: self.reader.error_position(),
            })?;

            let at_start = !self.started;
            self.started = true;

            match event {
                Event::Start(e) => {
                    let (element, prefixes) = self.open_element(&e)?;
                    self.stack.push(element);
                    self.scopes.push(prefixes);
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let element = self
                        .stack
                        .pop()
                        .ok_or_else(|| XmlError::UnexpectedEndTag(name.clone()))?;
                    self.scopes.pop();

                    if element.name != name {
                        return Err(XmlError::MismatchedEndTag {
                            expected: element.name,
                            found: name,
                        });
                    }

                    self.attach(Node::Element(element))?;
                }
                Event::Empty(e) => {
                    let (element, _) = self.open_element(&e)?;
                    self.attach(Node::Element(element))?;
                }
                Event::Text(e) => {
                    if e.windows(3).any(|w| w == b"]]>") {
                        return Err(XmlError::CdataEndInText);
                    }
                    let text = e.unescape().map_err(|err| XmlError::Syntax {
                        message: format!("invalid text content: {}", err),
                        position: self.reader.buffer_position(),
                    })?;
                    check_chars(&text)?;
                    self.push_text(text.into_owned())?;
                }
                Event::CData(e) => {
                    if self.stack.is_empty() {
                        return Err(XmlError::MisplacedMarkup("CDATA section outside the root"));
                    }
                    let text = String::from_utf8_lossy(&e).into_owned();
                    check_chars(&text)?;
                    self.push_text(text)?;
                }
                Event::Comment(e) => {
                    let comment = String::from_utf8_lossy(&e).into_owned();
                    check_comment(&comment)?;
                    self.push_child(Node::Comment(comment));
                }
                // The declaration carries no tree content but must open the text
                Event::Decl(_) => {
                    if !at_start {
                        return Err(XmlError::MisplacedMarkup("XML declaration"));
                    }
                }
                Event::DocType(_) => {
                    if self.doctype_seen || self.root_seen || !self.stack.is_empty() {
                        return Err(XmlError::MisplacedMarkup("DOCTYPE"));
                    }
                    self.doctype_seen = true;
                }
                Event::PI(e) => {
                    let target = String::from_utf8_lossy(e.target()).into_owned();
                    if target.eq_ignore_ascii_case("xml") {
                        return Err(XmlError::ReservedTarget(target));
                    }
                    check_name(&target)?;
                }
                Event::Eof => break,
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(XmlError::UnclosedElement(open.name.clone()));
        }

        if !self.root_seen {
            return Err(XmlError::EmptyDocument);
        }

        Ok(Document::new(self.top_level))
    }

    /// Build an element from its start tag, along with the namespace
    /// prefixes it declares.
    fn open_element(&self, e: &BytesStart<'_>) -> Result<(Element, Vec<String>)> {
        if self.stack.len() >= self.max_depth {
            return Err(XmlError::TooDeep(self.max_depth));
        }

        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        check_qname(&name)?;

        // Only one root element is allowed
        if self.stack.is_empty() && self.root_seen {
            return Err(XmlError::MultipleRoots(name));
        }

        if !attributes_are_separated(e.attributes_raw()) {
            return Err(XmlError::Attribute {
                element: name,
                message: "attributes must be separated by whitespace".to_string(),
            });
        }

        let mut element = Element::new(name);
        let mut declared = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| XmlError::Attribute {
                element: element.name.clone(),
                message: err.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            check_qname(&key)?;

            if attr.value.contains(&b'<') {
                return Err(XmlError::Attribute {
                    element: element.name.clone(),
                    message: format!("`<` is not allowed in the value of `{}`", key),
                });
            }

            let value = attr.unescape_value().map_err(|err| XmlError::Attribute {
                element: element.name.clone(),
                message: err.to_string(),
            })?;
            check_chars(&value)?;

            if let Some(prefix) = key.strip_prefix("xmlns:") {
                if value.is_empty() {
                    return Err(XmlError::Attribute {
                        element: element.name.clone(),
                        message: format!("namespace prefix `{}` cannot be undeclared", prefix),
                    });
                }
                declared.push(prefix.to_string());
            }

            element.attributes.push(Attribute::new(key, value.into_owned()));
        }

        // Prefixes resolve against this element's declarations and every enclosing one
        let names = std::iter::once(&element.name).chain(
            element
                .attributes
                .iter()
                .map(|attr| &attr.name)
                .filter(|name| !name.starts_with("xmlns:")),
        );
        for qname in names {
            if let Some(prefix) = prefix_of(qname) {
                if !self.is_bound(prefix, &declared) {
                    return Err(XmlError::UnboundPrefix(prefix.to_string()));
                }
            }
        }

        Ok((element, declared))
    }

    fn is_bound(&self, prefix: &str, declared: &[String]) -> bool {
        prefix == "xml"
            || declared
                .iter()
                .chain(self.scopes.iter().flatten())
                .any(|bound| bound == prefix)
    }

    /// Hand a finished element to its parent, or make it the root
    fn attach(&mut self, node: Node) -> Result<()> {
        if self.stack.is_empty() {
            if self.root_seen {
                let name = node.as_element().map(|e| e.name.clone()).unwrap_or_default();
                return Err(XmlError::MultipleRoots(name));
            }
            self.root_seen = true;
        }
        self.push_child(node);
        Ok(())
    }

    fn push_text(&mut self, text: String) -> Result<()> {
        if self.stack.is_empty() {
            // Whitespace between top-level nodes is not part of the document
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(XmlError::TextOutsideRoot);
        }
        self.push_child(Node::Text(text));
        Ok(())
    }

    fn push_child(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.top_level.push(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Document> {
        try_parse(text, &ParseOptions::default())
    }

    #[test]
    fn test_self_closing_root() {
        let doc = parse("<root/>").unwrap();
        assert!(doc.is_well_formed());
        assert_eq!(doc.root().unwrap().name, "root");
        assert!(!doc.root().unwrap().has_children());
    }

    #[test]
    fn test_lone_angle_bracket_is_rejected() {
        assert!(parse("<").is_err());
        let doc = parse_document("<", &ParseOptions::default());
        assert!(!doc.is_well_formed());
        assert!(doc.parser_error_message().is_some());
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert_eq!(parse(""), Err(XmlError::EmptyDocument));
        assert_eq!(parse("  \n "), Err(XmlError::EmptyDocument));
        assert!(!parse_document("", &ParseOptions::default()).is_well_formed());
    }

    #[test]
    fn test_mismatched_and_unclosed_tags() {
        assert!(parse("<a><b></a></b>").is_err());
        assert!(parse("</a>").is_err());
        assert!(matches!(
            parse("<a><b/>"),
            Err(XmlError::UnclosedElement(_)) | Err(XmlError::Syntax { .. })
        ));
    }

    #[test]
    fn test_multiple_roots_and_stray_text() {
        assert_eq!(
            parse("<a/><b/>"),
            Err(XmlError::MultipleRoots("b".to_string()))
        );
        assert_eq!(parse("<a/>tail"), Err(XmlError::TextOutsideRoot));
    }

    #[test]
    fn test_duplicate_attribute_is_rejected() {
        assert!(matches!(
            parse(r#"<a x="1" x="2"/>"#),
            Err(XmlError::Attribute { .. })
        ));
    }

    #[test]
    fn test_attributes_keep_order_and_unescape() {
        let doc = parse(r#"<a z="1" b="x &amp; y"/>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(
            root.attributes,
            vec![Attribute::new("z", "1"), Attribute::new("b", "x & y")]
        );
        assert_eq!(root.attribute("b"), Some("x & y"));
        assert_eq!(root.attribute("missing"), None);
    }

    #[test]
    fn test_whitespace_text_is_kept_inside_root() {
        let doc = parse("<a>\n  <b/>\n</a>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0], Node::text("\n  "));
    }

    #[test]
    fn test_comments_declaration_and_cdata() {
        let doc = parse("<?xml version=\"1.0\"?>\n<!--top--><a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.children[0], Node::comment("top"));
        assert_eq!(doc.root().unwrap().children, vec![Node::text("<raw>")]);
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions { max_depth: 2 };
        assert!(try_parse("<a><b/></a>", &options).is_ok());
        assert_eq!(
            try_parse("<a><b><c/></b></a>", &options),
            Err(XmlError::TooDeep(2))
        );
    }

    #[test]
    fn test_elements_named_in_document_order() {
        let doc = parse(r#"<r><error code="1"/><x><error code="2"/></x></r>"#).unwrap();
        let codes: Vec<_> = doc
            .elements_named("error")
            .iter()
            .map(|e| e.attribute("code").unwrap())
            .collect();
        assert_eq!(codes, vec!["1", "2"]);
    }

    #[test]
    fn test_lt_in_attribute_value_is_rejected() {
        assert!(matches!(
            parse(r#"<a b="<"/>"#),
            Err(XmlError::Attribute { .. })
        ));
        assert!(parse(r#"<a b="&lt;"/>"#).is_ok());
    }

    #[test]
    fn test_attributes_need_whitespace_between_them() {
        assert!(matches!(
            parse("<a b='1'c='2'/>"),
            Err(XmlError::Attribute { .. })
        ));
        assert!(parse("<a b='1' c='2'/>").is_ok());
        assert!(parse("<a b='1'\nc='2'></a>").is_ok());
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        assert_eq!(parse("<1a/>"), Err(XmlError::InvalidName("1a".to_string())));
        assert!(parse(r#"<a 2b="x"/>"#).is_err());
        assert!(parse("<a:b:c/>").is_err());
        assert!(parse("<données x.y-z=\"1\"/>").is_ok());
    }

    #[test]
    fn test_double_hyphen_in_comment_is_rejected() {
        assert_eq!(parse("<a><!-- x -- y --></a>"), Err(XmlError::InvalidComment));
        assert_eq!(parse("<a><!--x---></a>"), Err(XmlError::InvalidComment));
        assert!(parse("<a><!-- x - y --></a>").is_ok());
    }

    #[test]
    fn test_namespace_prefixes_must_be_declared() {
        assert_eq!(parse("<a><y:b/></a>"), Err(XmlError::UnboundPrefix("y".to_string())));
        assert_eq!(parse(r#"<a y:c="1"/>"#), Err(XmlError::UnboundPrefix("y".to_string())));
        assert!(parse(r#"<a xmlns:y="urn:y"><y:b y:c="1"/></a>"#).is_ok());
        assert!(parse(r#"<y:a xmlns:y="urn:y"/>"#).is_ok());
        assert!(parse(r#"<a xml:lang="en"/>"#).is_ok());

        // A declaration only covers the element that carries it and its descendants
        assert_eq!(
            parse(r#"<a><b xmlns:y="urn:y"/><y:c/></a>"#),
            Err(XmlError::UnboundPrefix("y".to_string()))
        );
        assert!(parse(r#"<a xmlns:y=""/>"#).is_err());
    }

    #[test]
    fn test_declaration_must_come_first() {
        assert_eq!(
            parse(r#"<?xml version="1.0"?><?xml version="1.0"?><a/>"#),
            Err(XmlError::MisplacedMarkup("XML declaration"))
        );
        assert!(parse(r#"<a><?xml version="1.0"?></a>"#).is_err());
        assert!(parse(r#"<?xml version="1.0"?><a/>"#).is_ok());
        assert!(parse("\u{FEFF}<?xml version=\"1.0\"?><a/>").is_ok());
    }

    #[test]
    fn test_doctype_only_before_root() {
        assert_eq!(
            parse("<a/><!DOCTYPE a>"),
            Err(XmlError::MisplacedMarkup("DOCTYPE"))
        );
        assert!(parse("<!DOCTYPE a><!DOCTYPE a><a/>").is_err());
        assert!(parse("<!DOCTYPE a><a/>").is_ok());
    }

    #[test]
    fn test_processing_instructions() {
        assert!(parse(r#"<?xml-stylesheet href="s.css"?><a/>"#).is_ok());
        assert!(parse("<a><?XML x?></a>").is_err());
    }

    #[test]
    fn test_cdata_end_in_text_is_rejected() {
        assert_eq!(parse("<a>]]></a>"), Err(XmlError::CdataEndInText));
        assert!(parse("<a>]] ></a>").is_ok());
        assert!(parse("<![CDATA[x]]><a/>").is_err());
    }

    #[test]
    fn test_control_characters_are_rejected() {
        assert_eq!(parse("<a>\u{1}</a>"), Err(XmlError::InvalidChar(1)));
        assert_eq!(parse("<a b=\"\u{8}\"/>"), Err(XmlError::InvalidChar(8)));
        assert!(parse("<a>&#1;</a>").is_err());
        assert!(parse("<a>\ttab\r\n</a>").is_ok());
    }

    #[test]
    fn test_malformed_inputs_are_not_well_formed() {
        let cases = [
            r#"<a b="<"/>"#,
            "<1a/>",
            "<a><!-- x -- y --></a>",
            "<a><y:b/></a>",
            r#"<?xml version="1.0"?><?xml version="1.0"?><a/>"#,
            "<a>]]></a>",
            "<a b='1'c='2'/>",
            "<a>\u{1}</a>",
            "<a/><!DOCTYPE a>",
        ];
        for case in cases {
            let doc = parse_document(case, &ParseOptions::default());
            assert!(!doc.is_well_formed(), "accepted {:?}", case);
        }
    }
}
