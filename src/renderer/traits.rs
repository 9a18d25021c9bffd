use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration context for rendering operations
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub depth: usize,
    pub format: OutputFormat,
}

impl RenderContext {
    pub fn new(format: OutputFormat) -> Self {
        Self { depth: 0, format }
    }

    pub fn with_depth(&self, depth: usize) -> Self {
        Self {
            depth,
            format: self.format,
        }
    }

    pub fn nested(&self) -> Self {
        self.with_depth(self.depth + 1)
    }

    pub fn indent(&self) -> String {
        self.format.indent_unit().repeat(self.depth)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Output format configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Escaped markup with `<span class='…'>` category markers
    #[default]
    Html,
    /// Raw text coloured for a terminal
    Ansi,
    /// Raw text without markers
    Plain,
    /// Serialized view state; tree panels use the plain layout
    Json,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 4] = ["html", "ansi", "plain", "json"];

    /// One level of indentation
    pub fn indent_unit(&self) -> &'static str {
        match self {
            OutputFormat::Html => "&nbsp;&nbsp;",
            OutputFormat::Ansi | OutputFormat::Plain | OutputFormat::Json => "  ",
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, OutputFormat::Html)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Html => "html",
            OutputFormat::Ansi => "ansi",
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "ansi" => Ok(OutputFormat::Ansi),
            "plain" | "text" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow::anyhow!("unknown output format: {}", other)),
        }
    }
}

/// Core rendering trait for documents, nodes and extracted records
pub trait Render {
    fn render(&self, context: &RenderContext) -> String;
}

impl<T: Render> Render for [T] {
    fn render(&self, context: &RenderContext) -> String {
        self.iter().map(|item| item.render(context)).collect()
    }
}
