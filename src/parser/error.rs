use thiserror::Error;

pub type Result<T> = std::result::Result<T, XmlError>;

/// Reasons a text fails to become a well-formed document.
///
/// These never escape the pipeline: a failed parse is folded into a
/// parser-error marker and the document is classified as invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { message: String, position: u64 },

    #[error("mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEndTag(String),

    #[error("unexpected end of input, expected closing tag </{0}>")]
    UnclosedElement(String),

    #[error("invalid attribute on <{element}>: {message}")]
    Attribute { element: String, message: String },

    #[error("empty XML document: no root element found")]
    EmptyDocument,

    #[error("invalid XML: multiple root elements (second root <{0}>)")]
    MultipleRoots(String),

    #[error("invalid XML: text content outside the root element")]
    TextOutsideRoot,

    #[error("document nesting exceeds the limit of {0} levels")]
    TooDeep(usize),

    #[error("invalid XML name `{0}`")]
    InvalidName(String),

    #[error("character U+{0:04X} is not allowed in XML")]
    InvalidChar(u32),

    #[error("`--` is not allowed inside a comment")]
    InvalidComment,

    #[error("`]]>` is not allowed in text content")]
    CdataEndInText,

    #[error("{0} is not allowed here")]
    MisplacedMarkup(&'static str),

    #[error("processing instruction target `{0}` is reserved")]
    ReservedTarget(String),

    #[error("namespace prefix `{0}` is not declared")]
    UnboundPrefix(String),
}
