//! Maps a [`ViewState`] onto terminal text, a standalone HTML page or JSON.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::pipeline::{PanelKind, ViewState};
use crate::renderer::{escape_markup, OutputFormat};

const PAGE_TITLE: &str = "XML Viewer";

const PAGE_STYLE: &str = "\
.tooltip { font-family: sans-serif; border: 1px solid #888; padding: 8px; background: #fafafa; }
#title { font-weight: bold; cursor: move; margin-bottom: 4px; }
.panel { overflow: auto; max-height: 50vh; max-width: 50vw; }
.hidden { display: none; }
.panel.hidden:target { display: block; }
.active_tab { font-weight: bold; }
.tag_name { color: #1a4fa0; }
.attr_name { color: #8a3b00; }
.attr_value { color: #1d7a1d; }
.comment { color: #888; font-style: italic; }
.text_node { color: #222; }
";

// Tab clicks follow ViewState::toggle: hide every panel, then open the
// clicked one unless it was open or has no content.
const PAGE_SCRIPT: &str = "\
document.querySelectorAll('.tab').forEach(function (tab) {
  tab.addEventListener('click', function (event) {
    event.preventDefault();
    var panel = document.getElementById(tab.dataset.panel);
    var wasOpen = !panel.classList.contains('hidden');
    document.querySelectorAll('.panel').forEach(function (p) { p.classList.add('hidden'); });
    document.querySelectorAll('.tab').forEach(function (t) { t.classList.remove('active_tab'); });
    if (wasOpen || panel.innerHTML === '') {
      return;
    }
    panel.classList.remove('hidden');
    tab.classList.add('active_tab');
  });
});
";

pub struct Presenter {
    format: OutputFormat,
    show_all: bool,
}

impl Presenter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            show_all: false,
        }
    }

    /// Show every panel that has content instead of only the visible one
    pub fn show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn present(&self, state: &ViewState) -> Result<String> {
        match self.format {
            OutputFormat::Html => Ok(self.present_html(state)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(state).context("Failed to serialize view state")
            }
            OutputFormat::Ansi | OutputFormat::Plain => Ok(self.present_terminal(state)),
        }
    }

    fn is_shown(&self, state: &ViewState, kind: PanelKind) -> bool {
        if self.show_all {
            state.non_empty_panels().contains(&kind)
        } else {
            state.is_visible(kind)
        }
    }

    fn present_terminal(&self, state: &ViewState) -> String {
        let mut output = String::new();

        // Tab line, the open panel's caption marked
        let captions: Vec<String> = PanelKind::ALL
            .iter()
            .map(|kind| {
                let caption = state.tab_caption(*kind);
                match (state.is_visible(*kind), self.format) {
                    (true, OutputFormat::Ansi) => caption.bold().underline().to_string(),
                    (true, _) => format!("[{}]", caption),
                    (false, _) => caption,
                }
            })
            .collect();
        output.push_str(&format!("Views: {}\n", captions.join(" | ")));
        output.push_str(&format!("{}\n", state.status_line()));

        for kind in PanelKind::ALL {
            if !self.is_shown(state, kind) {
                continue;
            }

            output.push('\n');
            if self.show_all {
                output.push_str(&format!("--- {} ---\n", state.tab_caption(kind)));
            }
            output.push_str(state.panel(kind));
        }

        output
    }

    fn present_html(&self, state: &ViewState) -> String {
        let mut output = String::new();

        output.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        output.push_str(&format!("<title>{}</title>\n", PAGE_TITLE));
        output.push_str(&format!("<style>\n{}</style>\n", PAGE_STYLE));
        output.push_str("</head>\n<body>\n<div class=\"tooltip\" id=\"tooltip\">\n");
        output.push_str(&format!("<div id=\"title\">{}</div>\n", PAGE_TITLE));

        // Tabs
        let tabs: Vec<String> = PanelKind::ALL
            .iter()
            .map(|kind| {
                let class = if self.is_shown(state, *kind) {
                    "tab active_tab"
                } else {
                    "tab"
                };
                format!(
                    "<a id=\"{kind}_tab\" class=\"{class}\" href=\"#{kind}_panel\" data-panel=\"{kind}_panel\">{caption}</a>",
                    kind = kind,
                    class = class,
                    caption = escape_markup(&state.tab_caption(*kind))
                )
            })
            .collect();
        output.push_str(&format!("<div>Views: {}</div>\n", tabs.join(" | ")));
        output.push_str(&format!(
            "<div id=\"status_tab\">{}</div>\n",
            escape_markup(&state.status_line())
        ));

        // Panels; the tree keeps its line breaks inside <pre>
        for kind in PanelKind::ALL {
            let tag = if kind == PanelKind::Xml { "pre" } else { "div" };
            let class = if self.is_shown(state, kind) {
                "panel"
            } else {
                "panel hidden"
            };
            output.push_str(&format!(
                "<{tag} id=\"{kind}_panel\" class=\"{class}\">{content}</{tag}>\n",
                tag = tag,
                kind = kind,
                class = class,
                content = state.panel(kind)
            ));
        }

        output.push_str("</div>\n");
        output.push_str(&format!("<script>\n{}</script>\n", PAGE_SCRIPT));
        output.push_str("</body>\n</html>\n");
        output
    }
}
