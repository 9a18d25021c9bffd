//! Parse → validate → extract → strip → render, folded into one view state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::extract::{extract, strip_tags, ErrorRecord, WarningRecord, ERROR_TAG, WARNING_TAG};
use crate::parser::{parse_document, ParseOptions};
use crate::renderer::{OutputFormat, PanelRenderer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Ready,
    Ok,
    IncorrectData,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "READY"),
            Status::Ok => write!(f, "OK"),
            Status::IncorrectData => write!(f, "INCORRECT DATA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Xml,
    Errors,
    Warnings,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Xml, PanelKind::Errors, PanelKind::Warnings];
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelKind::Xml => write!(f, "xml"),
            PanelKind::Errors => write!(f, "errors"),
            PanelKind::Warnings => write!(f, "warnings"),
        }
    }
}

impl FromStr for PanelKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(PanelKind::Xml),
            "errors" => Ok(PanelKind::Errors),
            "warnings" => Ok(PanelKind::Warnings),
            other => Err(anyhow::anyhow!("unknown panel: {}", other)),
        }
    }
}

/// Rendered content of the three panels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Panels {
    pub xml: String,
    pub errors: String,
    pub warnings: String,
}

/// Everything a presentation needs to draw the viewer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub status: Status,
    /// Length of the fetched text in bytes
    pub xml_bytes: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub panels: Panels,
    pub errors: Vec<ErrorRecord>,
    pub warnings: Vec<WarningRecord>,
    pub visible: Option<PanelKind>,
    /// Why the last text was rejected, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl ViewState {
    /// State before anything has been loaded
    pub fn ready() -> Self {
        Self::default()
    }

    /// State after text that is not well-formed (or was never fetched)
    pub fn incorrect_data(parse_error: Option<String>) -> Self {
        Self {
            status: Status::IncorrectData,
            parse_error,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn status_line(&self) -> String {
        format!("Status: {}", self.status)
    }

    pub fn tab_caption(&self, kind: PanelKind) -> String {
        match kind {
            PanelKind::Xml => format!("XML ({} bytes)", self.xml_bytes),
            PanelKind::Errors => format!("Errors ({})", self.error_count),
            PanelKind::Warnings => format!("Warnings ({})", self.warning_count),
        }
    }

    pub fn panel(&self, kind: PanelKind) -> &str {
        match kind {
            PanelKind::Xml => &self.panels.xml,
            PanelKind::Errors => &self.panels.errors,
            PanelKind::Warnings => &self.panels.warnings,
        }
    }

    /// Panels with content, for presentations that show them all at once
    pub fn non_empty_panels(&self) -> Vec<PanelKind> {
        PanelKind::ALL
            .into_iter()
            .filter(|kind| !self.panel(*kind).is_empty())
            .collect()
    }

    pub fn is_visible(&self, kind: PanelKind) -> bool {
        self.visible == Some(kind)
    }

    pub fn hide_all(&mut self) {
        self.visible = None;
    }

    /// Toggle one panel: every other panel is hidden first, and an empty
    /// panel is never opened.
    pub fn toggle(&mut self, kind: PanelKind) {
        let was_visible = self.is_visible(kind);
        self.hide_all();

        if self.panel(kind).is_empty() {
            return;
        }

        if !was_visible {
            self.visible = Some(kind);
        }
    }
}

/// Turns fetched text into a fresh [`ViewState`].
///
/// Holds no state between runs: the same text always yields the same view.
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    format: OutputFormat,
    options: ParseOptions,
}

impl DocumentPipeline {
    pub fn new(format: OutputFormat, options: ParseOptions) -> Self {
        Self { format, options }
    }

    pub fn run(&self, text: &str) -> ViewState {
        let document = parse_document(text, &self.options);

        if !document.is_well_formed() {
            debug!(bytes = text.len(), "document rejected");
            return ViewState::incorrect_data(document.parser_error_message().map(str::to_string));
        }

        // Extract both kinds before stripping either
        let errors: Vec<ErrorRecord> = extract(&document);
        let warnings: Vec<WarningRecord> = extract(&document);
        let stripped = strip_tags(&document, &[ERROR_TAG, WARNING_TAG]);

        debug!(
            bytes = text.len(),
            errors = errors.len(),
            warnings = warnings.len(),
            "document accepted"
        );

        let renderer = PanelRenderer::new(self.format);
        let panels = Panels {
            xml: renderer.render_xml(&stripped),
            errors: renderer.render_errors(&errors),
            warnings: renderer.render_warnings(&warnings),
        };

        ViewState {
            status: Status::Ok,
            xml_bytes: text.len(),
            error_count: errors.len(),
            warning_count: warnings.len(),
            panels,
            errors,
            warnings,
            visible: None,
            parse_error: None,
        }
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new(OutputFormat::default(), ParseOptions::default())
    }
}
