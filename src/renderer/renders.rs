use crate::extract::{ErrorRecord, WarningRecord};
use crate::parser::*;
use crate::renderer::components::*;
use crate::renderer::traits::*;

impl Render for Document {
    fn render(&self, context: &RenderContext) -> String {
        self.children.render(context)
    }
}

impl Render for Node {
    fn render(&self, context: &RenderContext) -> String {
        let indent = context.indent();
        let highlighter = Highlighter::for_context(context);

        match self {
            Node::Element(element) => element.render(context),
            Node::Comment(comment) => {
                // The delimiters belong to the comment fragment
                let fragment = format!("<!-- {} -->", comment);
                format!("{}{}\n", indent, highlighter.wrap(&fragment, SpanClass::Comment))
            }
            Node::Text(text) if !text.trim().is_empty() => {
                format!("{}{}\n", indent, highlighter.wrap(text, SpanClass::TextNode))
            }
            Node::Text(_) => String::new(),
            Node::ParserError(message) => Element::new(PARSER_ERROR_TAG)
                .with_child(Node::text(message.as_str()))
                .render(context),
        }
    }
}

impl Render for Element {
    fn render(&self, context: &RenderContext) -> String {
        let mut output = String::new();
        let indent = context.indent();
        let highlighter = Highlighter::for_context(context);
        let head = highlighter.tag_head(&self.name, &self.attributes);

        if !self.has_children() {
            output.push_str(&format!(
                "{}{}{}/{}\n",
                indent,
                highlighter.lt(),
                head,
                highlighter.gt()
            ));
            return output;
        }

        // Opening tag
        output.push_str(&format!(
            "{}{}{}{}\n",
            indent,
            highlighter.lt(),
            head,
            highlighter.gt()
        ));

        // Children one level deeper
        output.push_str(&self.children.render(&context.nested()));

        // Closing tag
        output.push_str(&format!(
            "{}{}/{}{}\n",
            indent,
            highlighter.lt(),
            highlighter.wrap(&self.name, SpanClass::TagName),
            highlighter.gt()
        ));

        output
    }
}

impl Render for ErrorRecord {
    fn render(&self, context: &RenderContext) -> String {
        let highlighter = Highlighter::for_context(context);
        format!(
            "{}{}",
            highlighter.bold(&format!("Code {}: ", self.code)),
            highlighter.text(&self.text)
        )
    }
}

impl Render for WarningRecord {
    fn render(&self, context: &RenderContext) -> String {
        Highlighter::for_context(context).text(&self.text)
    }
}
