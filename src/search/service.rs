//! Debounced member search.
//!
//! Every call to [`MemberSearch::set_query`] bumps a generation counter and replaces the
//! pending lookup. A lookup waits out the quiet period on a spawned task, then issues
//! `ApiEffect::SearchMembers` and sends its result back tagged with the generation it was
//! issued for. Only a response whose generation is still the latest is applied; anything
//! older is discarded as stale.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ApiError, ApiErrorKind};
use crate::config::SearchConfig;
use crate::effects::{ApiEffect, ApiInterpreter, ApiResponse};
use crate::roster::{AddOutcome, RosterError, RosterSet};
use crate::types::{AccessToken, Identity};

use super::selection::{Selection, ToggleOutcome, visible_results};

/// A lookup result travelling back from the spawned task.
#[derive(Debug)]
struct SearchResponse {
    generation: u64,
    query: String,
    result: Result<Vec<Identity>, ApiError>,
}

/// What happened to a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response was for the latest query; results were replaced.
    Applied { query: String, count: usize },

    /// The response was for a superseded query and was dropped.
    Stale { generation: u64 },

    /// The lookup for the latest query failed; previous results are kept.
    Failed { kind: ApiErrorKind, message: String },
}

/// Debounced lookup of candidate teammates plus the user's selection among them.
pub struct MemberSearch<A> {
    api: Arc<A>,
    config: SearchConfig,
    token: Option<AccessToken>,

    /// Generation of the most recently issued query.
    generation: u64,
    query: String,

    /// True while a lookup for the latest generation has not reported back.
    awaiting: bool,

    /// Cancels the pending quiet-period wait for the latest query.
    pending: Option<CancellationToken>,

    /// Cancels everything this service spawned, including requests in flight.
    shutdown: CancellationToken,

    tx: mpsc::UnboundedSender<SearchResponse>,
    rx: mpsc::UnboundedReceiver<SearchResponse>,

    results: Vec<Identity>,
    selection: Selection,
    error: Option<String>,
}

impl<A: ApiInterpreter + 'static> MemberSearch<A> {
    pub fn new(api: Arc<A>, config: SearchConfig, token: Option<AccessToken>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        MemberSearch {
            api,
            config,
            token,
            generation: 0,
            query: String::new(),
            awaiting: false,
            pending: None,
            shutdown: CancellationToken::new(),
            tx,
            rx,
            results: Vec::new(),
            selection: Selection::new(),
            error: None,
        }
    }

    /// Replaces the query, superseding any pending lookup.
    ///
    /// Must be called from within a tokio runtime: qualifying queries spawn a task.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.generation += 1;
        self.error = None;
        self.awaiting = false;
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }

        let trimmed = self.query.trim();
        if trimmed.chars().count() < self.config.min_query_len {
            self.results.clear();
            debug!(generation = self.generation, "Query too short, results cleared");
            return;
        }

        let generation = self.generation;
        let query = trimmed.to_string();
        let quiet = self.config.quiet_period;
        let wait = self.shutdown.child_token();
        let shutdown = self.shutdown.clone();
        let api = Arc::clone(&self.api);
        let token = self.token.clone();
        let tx = self.tx.clone();

        debug!(generation, query = %query, "Scheduling member search");
        self.pending = Some(wait.clone());
        self.awaiting = true;

        tokio::spawn(async move {
            tokio::select! {
                _ = wait.cancelled() => {
                    debug!(generation, "Member search superseded before firing");
                    return;
                }
                _ = tokio::time::sleep(quiet) => {}
            }

            let effect = ApiEffect::SearchMembers {
                query: query.clone(),
            };
            let result = tokio::select! {
                _ = shutdown.cancelled() => return,
                r = api.interpret(effect, token) => r.and_then(ApiResponse::into_candidates),
            };

            // The receiver is gone only when the service was dropped.
            let _ = tx.send(SearchResponse {
                generation,
                query,
                result,
            });
        });
    }

    /// Waits for the next lookup response and applies it.
    ///
    /// Returns `None` immediately when no lookup for the current query is outstanding and
    /// nothing is queued.
    pub async fn next_response(&mut self) -> Option<SearchOutcome> {
        if let Ok(response) = self.rx.try_recv() {
            return Some(self.apply(response));
        }
        if !self.awaiting {
            return None;
        }
        let response = self.rx.recv().await?;
        Some(self.apply(response))
    }

    /// Waits until the lookup for the current query has reported back, discarding stale
    /// responses on the way. Returns the outcome for the current query, if one was pending.
    pub async fn settle(&mut self) -> Option<SearchOutcome> {
        while let Some(outcome) = self.next_response().await {
            if !matches!(outcome, SearchOutcome::Stale { .. }) {
                return Some(outcome);
            }
        }
        None
    }

    /// Applies every response that has already arrived, without waiting.
    pub fn drain_ready(&mut self) -> Vec<SearchOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(response) = self.rx.try_recv() {
            outcomes.push(self.apply(response));
        }
        outcomes
    }

    fn apply(&mut self, response: SearchResponse) -> SearchOutcome {
        if response.generation != self.generation {
            debug!(
                generation = response.generation,
                current = self.generation,
                "Discarding stale search response"
            );
            return SearchOutcome::Stale {
                generation: response.generation,
            };
        }

        self.awaiting = false;
        self.pending = None;
        match response.result {
            Ok(candidates) => {
                let count = candidates.len();
                debug!(generation = response.generation, count, "Applied search results");
                self.results = candidates;
                SearchOutcome::Applied {
                    query: response.query,
                    count,
                }
            }
            Err(e) => {
                warn!(error = %e, query = %response.query, "Member search failed");
                self.error = Some(e.message.clone());
                SearchOutcome::Failed {
                    kind: e.kind,
                    message: e.message,
                }
            }
        }
    }

    /// Toggles a candidate, limited by the roster's remaining capacity.
    ///
    /// A selected candidate can always be deselected. Only candidates in the current
    /// results who are not yet on the roster can be selected.
    pub fn toggle(&mut self, candidate: &Identity, roster: &RosterSet) -> ToggleOutcome {
        if !self.selection.is_selected(&candidate.id)
            && (roster.contains(&candidate.id)
                || !self.results.iter().any(|c| c.id == candidate.id))
        {
            debug!(user_id = %candidate.id, "Candidate not selectable");
            return ToggleOutcome::Unavailable;
        }
        self.selection.toggle(candidate, roster.remaining_capacity())
    }

    /// Hands the selection to the roster, then clears query, results, and selection.
    ///
    /// Clearing happens whether or not the roster accepted the batch.
    pub fn confirm(&mut self, roster: &mut RosterSet) -> Result<AddOutcome, RosterError> {
        let picked = self.selection.take();
        let outcome = roster.add_members(&picked);
        self.clear();
        outcome
    }

    /// Resets to an empty query, superseding any pending lookup.
    pub fn clear(&mut self) {
        self.query.clear();
        self.generation += 1;
        self.awaiting = false;
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
        self.results.clear();
        self.selection = Selection::new();
        self.error = None;
    }

    /// Results for display: roster members hidden, selected candidates first.
    pub fn visible_results(&self, roster: &RosterSet) -> Vec<Identity> {
        visible_results(&self.results, roster, &self.selection)
    }
}

impl<A> MemberSearch<A> {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.awaiting
    }

    pub fn results(&self) -> &[Identity] {
        &self.results
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<A> Drop for MemberSearch<A> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl<A> std::fmt::Debug for MemberSearch<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberSearch")
            .field("generation", &self.generation)
            .field("query", &self.query)
            .field("awaiting", &self.awaiting)
            .field("results", &self.results.len())
            .field("selected", &self.selection.len())
            .finish_non_exhaustive()
    }
}
