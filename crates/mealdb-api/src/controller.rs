//! Query controller: incremental suggestions and committed searches
//!
//! The owning thread keeps the [`SearchState`]; network calls run on worker
//! threads and come back tagged with the id of the request that produced them.
//! Only the response to the most recently issued request of each kind is
//! applied, so a slow answer to an older input can never overwrite a newer one.

use crate::client::MealApi;
use crate::config::Config;
use crate::error::{ApiError, SearchError};
use crate::meal::Meal;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A `search.php` call issued by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: u64,
    pub term: String,
}

#[derive(Debug)]
pub struct FetchResponse {
    pub id: u64,
    pub result: Result<Vec<Meal>, ApiError>,
}

/// Everything the renderer needs, plus request bookkeeping
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub suggestions: Vec<Meal>,
    pub results: Vec<Meal>,
    pub loading: bool,
    pub error: Option<String>,
    suggest_seq: u64,
    pending_suggest: Option<u64>,
    search_seq: u64,
    pending_search: Option<u64>,
}

impl SearchState {
    /// Record new input. Returns the suggestion fetch to issue, if the input is long enough.
    pub fn change_query(&mut self, text: &str, min_chars: usize) -> Option<FetchRequest> {
        self.query = text.to_string();
        // Any earlier suggestion request is stale from here on
        self.suggest_seq += 1;

        let term = text.trim();
        if term.chars().count() < min_chars {
            self.suggestions.clear();
            self.pending_suggest = None;
            return None;
        }

        self.pending_suggest = Some(self.suggest_seq);
        Some(FetchRequest {
            id: self.suggest_seq,
            term: term.to_string(),
        })
    }

    /// Apply a suggestion response. Returns false if it answered a superseded request.
    pub fn apply_suggestions(&mut self, response: FetchResponse, limit: usize) -> bool {
        if self.pending_suggest != Some(response.id) {
            log::debug!("Dropping superseded suggestions #{}", response.id);
            return false;
        }
        self.pending_suggest = None;

        match response.result {
            Ok(mut meals) => {
                meals.truncate(limit);
                self.suggestions = meals;
            }
            Err(e) => {
                log::warn!("Suggestion fetch failed: {}", e);
                self.suggestions.clear();
            }
        }
        true
    }

    /// Validate and start a committed search for `term`, or the stored query.
    pub fn begin_search(&mut self, term: Option<&str>) -> Result<FetchRequest, SearchError> {
        let effective = term.unwrap_or(&self.query).trim().to_string();
        if effective.is_empty() {
            self.error = Some(SearchError::Validation.to_string());
            return Err(SearchError::Validation);
        }

        self.loading = true;
        self.error = None;

        // A suggestion arriving after the commit must not reopen the dropdown
        self.suggest_seq += 1;
        self.pending_suggest = None;

        self.search_seq += 1;
        self.pending_search = Some(self.search_seq);
        Ok(FetchRequest {
            id: self.search_seq,
            term: effective,
        })
    }

    /// Apply a search response. `None` if it answered a superseded search,
    /// otherwise the number of results or the error now shown.
    pub fn apply_search(&mut self, response: FetchResponse) -> Option<Result<usize, SearchError>> {
        if self.pending_search != Some(response.id) {
            log::debug!("Dropping superseded search #{}", response.id);
            return None;
        }
        self.pending_search = None;
        self.loading = false;

        let outcome = match response.result {
            Ok(meals) if !meals.is_empty() => {
                self.results = meals;
                self.suggestions.clear();
                self.error = None;
                Ok(self.results.len())
            }
            Ok(_) => {
                self.results.clear();
                Err(SearchError::NotFound)
            }
            Err(e) => {
                log::warn!("Search #{} failed: {}", response.id, e);
                Err(SearchError::Network(e))
            }
        };

        if let Err(ref e) = outcome {
            self.error = Some(e.to_string());
        }
        Some(outcome)
    }

    /// Settle a pending search whose worker is gone. Returns false if nothing was pending.
    pub fn abandon_search(&mut self) -> bool {
        let Some(id) = self.pending_search else {
            return false;
        };
        self.apply_search(FetchResponse {
            id,
            result: Err(ApiError::WorkerStopped),
        })
        .is_some()
    }

    /// Settle a pending suggestion fetch whose worker is gone
    pub fn abandon_suggestions(&mut self) -> bool {
        let Some(id) = self.pending_suggest else {
            return false;
        };
        self.apply_suggestions(
            FetchResponse {
                id,
                result: Err(ApiError::WorkerStopped),
            },
            0,
        )
    }

    pub fn is_settled(&self) -> bool {
        self.pending_suggest.is_none() && self.pending_search.is_none()
    }
}

/// Spawn a worker that answers `search.php` requests.
///
/// Queued requests are coalesced: only the newest one is sent to the API.
pub fn spawn_search_worker(
    api: Arc<dyn MealApi>,
    query_rx: Receiver<FetchRequest>,
    result_tx: Sender<FetchResponse>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(mut request) = query_rx.recv() {
            while let Ok(next) = query_rx.try_recv() {
                request = next;
            }

            let start = Instant::now();
            let result = api.search(&request.term);
            log::debug!(
                "search #{} {:?} finished in {:?}",
                request.id,
                request.term,
                start.elapsed()
            );

            if result_tx
                .send(FetchResponse {
                    id: request.id,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
    })
}

/// Owns the search state and the two fetch workers (suggestions, committed searches)
pub struct QueryController {
    state: SearchState,
    suggestion_limit: usize,
    min_suggestion_chars: usize,
    suggest_tx: Sender<FetchRequest>,
    suggest_rx: Receiver<FetchResponse>,
    search_tx: Sender<FetchRequest>,
    search_rx: Receiver<FetchResponse>,
}

impl QueryController {
    pub fn new(api: Arc<dyn MealApi>, config: &Config) -> Self {
        let (suggest_tx, suggest_req_rx) = mpsc::channel::<FetchRequest>();
        let (suggest_resp_tx, suggest_rx) = mpsc::channel::<FetchResponse>();
        let (search_tx, search_req_rx) = mpsc::channel::<FetchRequest>();
        let (search_resp_tx, search_rx) = mpsc::channel::<FetchResponse>();

        spawn_search_worker(Arc::clone(&api), suggest_req_rx, suggest_resp_tx);
        spawn_search_worker(api, search_req_rx, search_resp_tx);

        Self {
            state: SearchState::default(),
            suggestion_limit: config.suggestion_limit,
            min_suggestion_chars: config.min_suggestion_chars,
            suggest_tx,
            suggest_rx,
            search_tx,
            search_rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn on_query_change(&mut self, text: &str) {
        if let Some(request) = self.state.change_query(text, self.min_suggestion_chars) {
            if self.suggest_tx.send(request).is_err() {
                self.state.abandon_suggestions();
            }
        }
    }

    /// Commit a search. Validation failures are reported immediately; the
    /// network outcome lands in the state on a later [`poll`](Self::poll).
    pub fn search(&mut self, term: Option<&str>) -> Result<(), SearchError> {
        let request = self.state.begin_search(term)?;
        log::debug!("search #{} {:?}", request.id, request.term);
        if self.search_tx.send(request).is_err() {
            self.state.abandon_search();
        }
        Ok(())
    }

    /// Apply every response that has arrived. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.suggest_rx.try_recv() {
                Ok(response) => {
                    changed |= self
                        .state
                        .apply_suggestions(response, self.suggestion_limit);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    changed |= self.state.abandon_suggestions();
                    break;
                }
            }
        }
        loop {
            match self.search_rx.try_recv() {
                Ok(response) => changed |= self.state.apply_search(response).is_some(),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    changed |= self.state.abandon_search();
                    break;
                }
            }
        }
        changed
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_settled()
    }

    /// Poll until no request is outstanding. Returns false on timeout.
    pub fn wait_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if self.is_settled() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}
