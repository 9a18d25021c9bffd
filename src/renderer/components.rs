use colored::Colorize;

use crate::parser::Attribute;
use crate::renderer::traits::*;

/// Replace `& < > " ' /` with their entity equivalents.
///
/// Single pass: text that is already escaped gets its `&` escaped again.
pub fn escape_markup(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            '/' => output.push_str("&#x2F;"),
            _ => output.push(ch),
        }
    }
    output
}

/// Semantic category of a highlighted fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanClass {
    TagName,
    AttrName,
    AttrValue,
    Comment,
    TextNode,
}

impl SpanClass {
    /// CSS class used by the HTML presentation
    pub fn class_name(&self) -> &'static str {
        match self {
            SpanClass::TagName => "tag_name",
            SpanClass::AttrName => "attr_name",
            SpanClass::AttrValue => "attr_value",
            SpanClass::Comment => "comment",
            SpanClass::TextNode => "text_node",
        }
    }
}

/// Helper for wrapping fragments in the category markers of a format
pub struct Highlighter {
    format: OutputFormat,
}

impl Highlighter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn for_context(context: &RenderContext) -> Self {
        Self::new(context.format)
    }

    pub fn wrap(&self, value: &str, class: SpanClass) -> String {
        match self.format {
            OutputFormat::Html => format!(
                "<span class='{}'>{}</span>",
                class.class_name(),
                escape_markup(value)
            ),
            OutputFormat::Ansi => {
                let styled = match class {
                    SpanClass::TagName => value.blue(),
                    SpanClass::AttrName => value.cyan(),
                    SpanClass::AttrValue => value.green(),
                    SpanClass::Comment => value.bright_black(),
                    SpanClass::TextNode => value.yellow(),
                };
                styled.to_string()
            }
            OutputFormat::Plain | OutputFormat::Json => value.to_string(),
        }
    }

    /// Text outside any category, escaped where the format needs it
    pub fn text(&self, value: &str) -> String {
        if self.format.is_markup() {
            escape_markup(value)
        } else {
            value.to_string()
        }
    }

    pub fn bold(&self, value: &str) -> String {
        match self.format {
            OutputFormat::Html => format!("<b>{}</b>", escape_markup(value)),
            OutputFormat::Ansi => value.bold().to_string(),
            OutputFormat::Plain | OutputFormat::Json => value.to_string(),
        }
    }

    /// Tag name followed by its attributes, as used inside `<…>`
    pub fn tag_head(&self, name: &str, attributes: &[Attribute]) -> String {
        let mut head = self.wrap(name, SpanClass::TagName);

        // Space before the list only when there is one
        if !attributes.is_empty() {
            head.push(' ');
        }

        let rendered: Vec<String> = attributes
            .iter()
            .map(|attr| {
                format!(
                    "{}={}",
                    self.wrap(&attr.name, SpanClass::AttrName),
                    self.wrap(&format!("\"{}\"", attr.value), SpanClass::AttrValue)
                )
            })
            .collect();
        head.push_str(&rendered.join(" "));
        head
    }

    pub fn lt(&self) -> &'static str {
        if self.format.is_markup() {
            "&lt;"
        } else {
            "<"
        }
    }

    pub fn gt(&self) -> &'static str {
        if self.format.is_markup() {
            "&gt;"
        } else {
            ">"
        }
    }
}
