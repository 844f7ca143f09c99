// Standard Library Imports
use std::{collections::BTreeMap, fmt::Display, sync::Arc, time::Duration};

// External Crate Imports
use chrono::{DateTime, Local};
use peaks::PeakSelection;
use tracing::{debug, error, info, warn};

// Local Crate Imports
use crate::{
    CancellationToken, Error, ParsedResponse, PersistRow, QueryForm, Reconciler, Reconciliation, ReducingEnd, Result,
    SearchParameters, SearchService, SingleChargedMass, build_query, call_service, extract_text, normalize_masses,
    parse_response, persist_rows,
};

// Constants ===========================================================================================================

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

// Public API ==========================================================================================================

/// Somewhere to keep a record of every search that was attempted
pub trait RunStore {
    type Error: Display;

    /// Stores `run` along with its `results` as a single unit, returning the new run's ID
    fn record_run(&mut self, run: &SearchRun, results: &[PersistRow]) -> Result<i64, Self::Error>;
}

/// The history entry of a single search
#[derive(Clone, PartialEq, Debug)]
pub struct SearchRun {
    pub date: DateTime<Local>,
    /// The masses that were selected, grouped by peak number
    pub data: BTreeMap<u32, Vec<f64>>,
    pub params: QueryForm,
    pub finished: bool,
}

impl SearchRun {
    #[must_use]
    pub fn new(selections: &[PeakSelection], params: QueryForm, finished: bool) -> Self {
        let mut data: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for selection in selections {
            data.entry(selection.peak_number.get())
                .or_default()
                .push(selection.mass);
        }
        Self {
            date: Local::now(),
            data,
            params,
            finished,
        }
    }
}

/// What became of a search's history entry
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Persistence {
    Recorded { run_id: i64 },
    Failed { reason: String },
}

/// Everything a completed search produced
#[derive(Clone, PartialEq, Debug)]
pub struct RunReport {
    pub masses: Vec<SingleChargedMass>,
    pub form: QueryForm,
    pub response: ParsedResponse,
    pub reconciliation: Reconciliation,
    pub persistence: Persistence,
}

/// Runs searches from selection to stored results, one step at a time
pub struct Pipeline<S> {
    service: Arc<dyn SearchService>,
    store: S,
    params: SearchParameters,
    reducing_end: ReducingEnd,
    timeout: Duration,
}

impl<S: RunStore> Pipeline<S> {
    pub fn new(
        service: Arc<dyn SearchService>,
        store: S,
        params: SearchParameters,
        reducing_end: ReducingEnd,
    ) -> Self {
        Self {
            service,
            store,
            params,
            reducing_end,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Searches for compositions matching `selections`. Once a query has been built, every failure leaves an
    /// unfinished entry in the history. Failing to store the results doesn't fail the search.
    pub fn run(&mut self, selections: &[PeakSelection], token: &CancellationToken) -> Result<RunReport> {
        let params = &self.params;
        let adduct = params.adduct()?;
        let masses = normalize_masses(selections, &adduct, params.mass_type)?;
        let form = build_query(&masses, params, &self.reducing_end)?;
        let reconciler = Reconciler::new(params.mass_type, adduct, self.reducing_end.clone());

        if token.is_cancelled() {
            warn!("the search was cancelled before it was sent");
            return Err(self.abandon(selections, form, Error::Cancelled));
        }

        info!("searching for compositions of {} mass(es)", masses.len());
        let body = match call_service(Arc::clone(&self.service), form.clone(), self.timeout, token) {
            Ok(body) => body,
            Err(err) => {
                error!("the search failed: {err}");
                return Err(self.abandon(selections, form, err));
            }
        };

        let response = parse_response(&extract_text(&body));
        debug!("the response contained {} block(s)", response.len());
        let reconciliation = match reconciler.reconcile(&masses, &response) {
            Ok(reconciliation) => reconciliation,
            Err(err) => {
                error!("the response couldn't be matched to the submitted masses: {err}");
                return Err(self.abandon(selections, form, err));
            }
        };

        if token.is_cancelled() {
            warn!("the search was cancelled before its results were stored");
            return Err(self.abandon(selections, form, Error::Cancelled));
        }

        let results = persist_rows(&reconciliation.submitted);
        let run = SearchRun::new(selections, form.clone(), true);
        let persistence = match self.store.record_run(&run, &results) {
            Ok(run_id) => {
                info!("stored {} result(s) as run {run_id}", results.len());
                Persistence::Recorded { run_id }
            }
            Err(err) => {
                let reason = err.to_string();
                error!("failed to store the search results: {reason}");
                self.record_unfinished(SearchRun { finished: false, ..run });
                Persistence::Failed { reason }
            }
        };

        Ok(RunReport {
            masses,
            form,
            response,
            reconciliation,
            persistence,
        })
    }

    fn abandon(&mut self, selections: &[PeakSelection], form: QueryForm, err: Error) -> Error {
        self.record_unfinished(SearchRun::new(selections, form, false));
        err
    }

    fn record_unfinished(&mut self, run: SearchRun) {
        match self.store.record_run(&run, &[]) {
            Ok(run_id) => debug!("recorded unfinished run {run_id}"),
            Err(err) => error!("failed to record an unfinished run: {err}"),
        }
    }
}
