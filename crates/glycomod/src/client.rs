// Standard Library Imports
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::{Duration, Instant},
};

// External Crate Imports
use tracing::{debug, warn};

// Local Crate Imports
use crate::{Error, QueryForm, Result};

// Constants ===========================================================================================================

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// Public API ==========================================================================================================

/// Anything that can answer a composition search with the text of its results page
pub trait SearchService: Send + Sync {
    fn search(&self, form: &QueryForm) -> Result<String>;
}

/// A flag shared between a running search and whoever may want to stop it
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Sends `form` to `service` from a worker thread, waiting until a response arrives, `timeout` passes, or `token` is
/// cancelled. A search that is abandoned keeps running in the background, but its response is discarded.
pub fn call_service(
    service: Arc<dyn SearchService>,
    form: QueryForm,
    timeout: Duration,
    token: &CancellationToken,
) -> Result<String> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // NOTE: The receiver is gone if the search was abandoned, and then there's nobody left to tell
        let _ = sender.send(service.search(&form));
    });

    let deadline = Instant::now() + timeout;
    loop {
        if token.is_cancelled() {
            warn!("the search was cancelled while waiting for a response");
            return Err(Error::Cancelled);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!("the search service took longer than {timeout:?} to respond");
            return Err(Error::Timeout {
                seconds: timeout.as_secs(),
            });
        }

        match receiver.recv_timeout(remaining.min(POLL_INTERVAL)) {
            Ok(response) => {
                debug!("the search service responded");
                return response;
            }
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::Network(
                    "the search stopped without sending a response".to_owned(),
                ));
            }
        }
    }
}

#[cfg(feature = "http")]
pub use http::HttpSearchService;

#[cfg(feature = "http")]
mod http {
    // Standard Library Imports
    use std::time::Duration;

    // External Crate Imports
    use reqwest::blocking::{
        Client,
        multipart::{Form, Part},
    };
    use tracing::{debug, error};

    // Local Crate Imports
    use super::SearchService;
    use crate::{Error, FormValue, QueryForm, Result};

    /// Posts searches as multipart forms to a web service
    #[derive(Clone, Debug)]
    pub struct HttpSearchService {
        client: Client,
        url: String,
    }

    impl HttpSearchService {
        pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .map_err(|e| Error::Network(e.to_string()))?;
            let url = url.into();
            Ok(Self { client, url })
        }

        #[must_use]
        pub fn url(&self) -> &str {
            &self.url
        }
    }

    impl SearchService for HttpSearchService {
        fn search(&self, form: &QueryForm) -> Result<String> {
            let multipart = form.fields().fold(Form::new(), |multipart, (name, value)| match value {
                FormValue::Text(text) => multipart.text(name.to_owned(), text.clone()),
                FormValue::File { file_name } => {
                    multipart.part(name.to_owned(), Part::bytes(Vec::new()).file_name(file_name.clone()))
                }
            });

            debug!("posting a composition search to {}", self.url);
            self.client
                .post(&self.url)
                .multipart(multipart)
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .map_err(|e| {
                    error!("the search service request failed: {e}");
                    Error::Network(e.to_string())
                })
        }
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowService {
        delay: Duration,
        response: Result<String>,
    }

    impl SearchService for SlowService {
        fn search(&self, _form: &QueryForm) -> Result<String> {
            thread::sleep(self.delay);
            self.response.clone()
        }
    }

    fn service(delay_ms: u64, response: Result<String>) -> Arc<dyn SearchService> {
        Arc::new(SlowService {
            delay: Duration::from_millis(delay_ms),
            response,
        })
    }

    #[test]
    fn responses_are_returned() {
        let token = CancellationToken::new();
        let response = call_service(
            service(10, Ok("1 structure found.".to_owned())),
            QueryForm::default(),
            Duration::from_secs(5),
            &token,
        );
        assert_eq!(response, Ok("1 structure found.".to_owned()));
    }

    #[test]
    fn service_errors_are_returned() {
        let failure = Err(Error::Network("connection refused".to_owned()));
        let response = call_service(
            service(0, failure.clone()),
            QueryForm::default(),
            Duration::from_secs(5),
            &CancellationToken::new(),
        );
        assert_eq!(response, failure);
    }

    #[test]
    fn slow_services_time_out() {
        let response = call_service(
            service(2_000, Ok(String::new())),
            QueryForm::default(),
            Duration::from_millis(100),
            &CancellationToken::new(),
        );
        assert_eq!(response, Err(Error::Timeout { seconds: 0 }));
    }

    #[test]
    fn searches_can_be_cancelled() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            canceller.cancel();
        });

        let started = Instant::now();
        let response = call_service(
            service(5_000, Ok(String::new())),
            QueryForm::default(),
            Duration::from_secs(10),
            &token,
        );
        assert_eq!(response, Err(Error::Cancelled));
        assert!(token.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn cancelled_before_starting() {
        let token = CancellationToken::new();
        token.cancel();
        let response = call_service(
            service(0, Ok(String::new())),
            QueryForm::default(),
            Duration::from_secs(1),
            &token,
        );
        assert_eq!(response, Err(Error::Cancelled));
    }
}
