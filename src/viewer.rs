use tracing::info;

use crate::fetch::{Fetcher, Method, Transport};
use crate::pipeline::{DocumentPipeline, PanelKind, ViewState};

/// One viewing session: the latest view state plus the means to replace it.
///
/// Every load fully replaces the previous state; the last one wins.
pub struct Viewer<T> {
    fetcher: Fetcher<T>,
    pipeline: DocumentPipeline,
    state: ViewState,
}

impl<T: Transport> Viewer<T> {
    pub fn new(fetcher: Fetcher<T>, pipeline: DocumentPipeline) -> Self {
        Self {
            fetcher,
            pipeline,
            state: ViewState::ready(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Fetch `target` and load whatever came back
    pub fn request(&mut self, method: Method, target: &str) -> &ViewState {
        let text = self.fetcher.fetch(method, target);
        self.load(&text)
    }

    pub fn load(&mut self, text: &str) -> &ViewState {
        let mut next = self.pipeline.run(text);

        // A good load leaves the open panel open; a bad one collapses everything
        if next.is_valid() {
            next.visible = self
                .state
                .visible
                .filter(|kind| !next.panel(*kind).is_empty());
        }

        info!(
            status = %next.status,
            errors = next.error_count,
            warnings = next.warning_count,
            "view updated"
        );
        self.state = next;
        &self.state
    }

    pub fn toggle(&mut self, kind: PanelKind) {
        self.state.toggle(kind);
    }
}
