use crate::extract::{ErrorRecord, WarningRecord};
use crate::parser::Document;
use crate::renderer::traits::*;

/// Renders the content of the three panels in one output format
pub struct PanelRenderer {
    format: OutputFormat,
}

impl PanelRenderer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Indented, highlighted tree starting at zero indentation
    pub fn render_xml(&self, document: &Document) -> String {
        document.render(&RenderContext::new(self.format))
    }

    pub fn render_errors(&self, records: &[ErrorRecord]) -> String {
        self.render_list(records)
    }

    pub fn render_warnings(&self, records: &[WarningRecord]) -> String {
        self.render_list(records)
    }

    fn render_list<R: Render>(&self, records: &[R]) -> String {
        let context = RenderContext::new(self.format);

        if self.format.is_markup() {
            // An ordered list is emitted even when there is nothing in it
            let items: String = records
                .iter()
                .map(|record| format!("<li>{}</li>", record.render(&context)))
                .collect();
            return format!("<ol>{}</ol>", items);
        }

        records
            .iter()
            .enumerate()
            .map(|(i, record)| format!("{}. {}\n", i + 1, record.render(&context)))
            .collect()
    }
}
