//! # xmlview
//!
//! Fetches an XML document, checks that it is well-formed, pulls its
//! `error`/`warning` elements out into lists and renders the rest as an
//! indented, syntax-highlighted tree.
//!
//! ```
//! use xmlview::{DocumentPipeline, OutputFormat, ParseOptions, PanelKind};
//!
//! let pipeline = DocumentPipeline::new(OutputFormat::Plain, ParseOptions::default());
//! let state = pipeline.run(r#"<data><warning text="slow"/><value>42</value></data>"#);
//!
//! assert_eq!(state.status_line(), "Status: OK");
//! assert_eq!(state.tab_caption(PanelKind::Warnings), "Warnings (1)");
//! assert_eq!(state.panels.xml, "<data>\n  <value>\n    42\n  </value>\n</data>\n");
//! ```

pub mod config;
pub mod extract;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod presenter;
pub mod renderer;
pub mod viewer;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use extract::{ErrorRecord, WarningRecord};
pub use fetch::{Fetcher, Method, ReqwestTransport, Transport};
pub use parser::{parse_document, try_parse, Document, Element, Node, ParseOptions, XmlError};
pub use pipeline::{DocumentPipeline, PanelKind, Status, ViewState};
pub use presenter::Presenter;
pub use renderer::{escape_markup, OutputFormat, Render, RenderContext};
pub use viewer::Viewer;
