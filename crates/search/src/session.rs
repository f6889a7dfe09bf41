//! Search-box model on top of a [`SearchHandler`]
//!
//! Tracks the query the user is currently looking at, so outcomes for any
//! older query are ignored, and keeps a keyboard-style selection over the
//! shown results. Every view change is published on a watch channel.

use crate::error::LookupError;
use crate::handler::{SearchHandler, SearchOptions, SearchOutcome};
use crate::lookup::Lookup;
use crate::Result;
use pacer_core::SearchConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// What the search box currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView<T> {
    Hidden,
    Loading {
        query: String,
    },
    Results {
        query: String,
        items: Vec<T>,
        selected: Option<usize>,
    },
    NoResults {
        query: String,
        error: Option<LookupError>,
    },
}

struct Shared<T> {
    current_query: Mutex<String>,
    view: watch::Sender<SessionView<T>>,
    max_results: usize,
}

pub struct SearchSession<L: Lookup> {
    handler: SearchHandler<L>,
    shared: Arc<Shared<L::Item>>,
}

impl<L> SearchSession<L>
where
    L: Lookup,
    L::Item: Clone,
{
    pub fn new(handler: SearchHandler<L>, max_results: usize) -> Self {
        let (view, _) = watch::channel(SessionView::Hidden);
        Self {
            handler,
            shared: Arc::new(Shared {
                current_query: Mutex::new(String::new()),
                view,
                max_results,
            }),
        }
    }

    /// Build the handler and session from a `[search]` config section
    pub fn with_config(lookup: L, config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let handler = SearchHandler::new(lookup, SearchOptions::from(config))?;
        Ok(Self::new(handler, config.max_results))
    }

    /// Handle new input text
    pub fn input(&self, text: &str) {
        let query = text.trim().to_owned();
        *self.shared.current_query.lock() = query.clone();

        if query.chars().count() < self.handler.options().min_length {
            self.shared.view.send_replace(SessionView::Hidden);
            return;
        }

        self.shared.view.send_replace(SessionView::Loading { query: query.clone() });

        let shared = Arc::clone(&self.shared);
        let issued = query.clone();
        self.handler.search(query, move |outcome| shared.apply(&issued, outcome));
    }

    /// Move the selection down, stopping at the last result
    pub fn select_next(&self) {
        self.shared.view.send_modify(|view| {
            if let SessionView::Results { items, selected, .. } = view {
                let last = items.len().saturating_sub(1);
                *selected = Some(selected.map_or(0, |idx| (idx + 1).min(last)));
            }
        });
    }

    /// Move the selection up; moving above the first result clears it
    pub fn select_previous(&self) {
        self.shared.view.send_modify(|view| {
            if let SessionView::Results { selected, .. } = view {
                *selected = selected.and_then(|idx| idx.checked_sub(1));
            }
        });
    }

    pub fn selected(&self) -> Option<L::Item> {
        match &*self.shared.view.borrow() {
            SessionView::Results {
                items,
                selected: Some(idx),
                ..
            } => items.get(*idx).cloned(),
            _ => None,
        }
    }

    pub fn view(&self) -> SessionView<L::Item> {
        self.shared.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView<L::Item>> {
        self.shared.view.subscribe()
    }

    pub fn query(&self) -> String {
        self.shared.current_query.lock().clone()
    }

    /// Reset to an empty, hidden search box
    pub fn clear(&self) {
        self.shared.current_query.lock().clear();
        self.shared.view.send_replace(SessionView::Hidden);
    }

    pub fn handler(&self) -> &SearchHandler<L> {
        &self.handler
    }

    pub fn destroy(&self) {
        self.handler.destroy();
        self.clear();
    }
}

impl<T: Clone> Shared<T> {
    fn apply(&self, issued: &str, outcome: SearchOutcome<T>) {
        let current = self.current_query.lock();
        if *current != issued {
            trace!(%issued, current = %*current, "ignoring stale search outcome");
            return;
        }

        let view = if let Some(error) = outcome.error {
            SessionView::NoResults {
                query: outcome.query,
                error: Some(error),
            }
        } else if outcome.results.is_empty() {
            SessionView::NoResults {
                query: outcome.query,
                error: None,
            }
        } else {
            let shown = outcome.results.len().min(self.max_results);
            SessionView::Results {
                query: outcome.query,
                items: outcome.results[..shown].to_vec(),
                selected: None,
            }
        };
        self.view.send_replace(view);
    }
}
