use std::io::Read;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::LookupError;
use crate::types::RecallResponse;

/// Recall listing endpoint of the FSIS public API.
pub const RECALL_ENDPOINT: &str = "https://www.fsis.usda.gov/fsis/api/recall/v/1";

/// `field_states_id` value for California.
pub const DEFAULT_STATE_ID: &str = "29";

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const STATE_PARAM: &str = "field_states_id";
const CLOSED_YEAR_PARAM: &str = "field_closed_year_id";

/// Builder for a [`RecallQuery`].
///
/// # Examples
///
/// ```no_run
/// use fsis_recall::RecallQuery;
///
/// let response = RecallQuery::builder()
///     .state_id("29")
///     .closed_year_id("446")
///     .build()
///     .send()?;
/// println!("{}", response);
/// # Ok::<(), fsis_recall::LookupError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RecallQueryBuilder {
    endpoint: String,
    state_id: String,
    closed_year_id: Option<String>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Default for RecallQueryBuilder {
    fn default() -> Self {
        RecallQueryBuilder {
            endpoint: RECALL_ENDPOINT.to_owned(),
            state_id: DEFAULT_STATE_ID.to_owned(),
            closed_year_id: None,
            headers: vec![
                ("accept".to_owned(), "application/json".to_owned()),
                ("user-agent".to_owned(), BROWSER_USER_AGENT.to_owned()),
            ],
            timeout: None,
        }
    }
}

impl RecallQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the `field_states_id` filter.
    pub fn state_id(mut self, state_id: impl Into<String>) -> Self {
        self.state_id = state_id.into();
        self
    }

    /// Add a `field_closed_year_id` filter.
    pub fn closed_year_id(mut self, year_id: impl Into<String>) -> Self {
        self.closed_year_id = Some(year_id.into());
        self
    }

    /// Set a request header, replacing any existing header of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Overall timeout for the request. Without one the call may block indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> RecallQuery {
        let mut params = vec![(STATE_PARAM.to_owned(), self.state_id)];
        if let Some(year) = self.closed_year_id {
            params.push((CLOSED_YEAR_PARAM.to_owned(), year));
        }
        RecallQuery {
            endpoint: self.endpoint,
            params,
            headers: self.headers,
            timeout: self.timeout,
        }
    }
}

/// A single GET against the recall API.
#[derive(Debug, Clone)]
pub struct RecallQuery {
    endpoint: String,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Default for RecallQuery {
    fn default() -> Self {
        RecallQueryBuilder::default().build()
    }
}

impl RecallQuery {
    pub fn builder() -> RecallQueryBuilder {
        RecallQueryBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Perform the request.
    ///
    /// Every HTTP status is returned as a [`RecallResponse`]; only failures to
    /// obtain or read a response are errors.
    pub fn send(&self) -> Result<RecallResponse, LookupError> {
        let mut agent = ureq::AgentBuilder::new();
        if let Some(timeout) = self.timeout {
            agent = agent.timeout(timeout);
        }
        let agent = agent.build();

        let mut request = agent.get(&self.endpoint);
        for (name, value) in &self.params {
            request = request.query(name, value);
        }
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }

        info!("GET {} {:?}", self.endpoint, self.params);
        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                debug!("server answered with status {}", code);
                response
            }
            Err(ureq::Error::Transport(transport)) => return Err(transport.into()),
        };

        let status = response.status();
        // `into_string` refuses bodies over 10 MB; the listing is returned whole.
        let mut body = String::new();
        response.into_reader().read_to_string(&mut body)?;
        debug!("received {} bytes with status {}", body.len(), status);

        Ok(RecallResponse { status, body })
    }
}

/// Run the default recall query (California, no year filter).
///
/// Equivalent to `RecallQuery::default().send()`.
pub fn fetch_recalls() -> Result<RecallResponse, LookupError> {
    RecallQuery::default().send()
}
