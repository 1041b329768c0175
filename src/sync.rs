//! Client side of persistence: a session that mutates its own collection
//! and pushes full snapshots to the save endpoint in the background.

use crate::app::SAVE_PATH;
use crate::models::{Expense, SaveAck};
use crate::storage::decode_collection;
use crate::tracker::{ExpenseForm, FormError, Tracker};
use crate::ui::extract_embedded;
use crate::views::Page;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug)]
pub enum SyncError {
    Http(reqwest::Error),
    Rejected { status: u16, message: String },
    MissingBootstrap,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Http(err) => write!(f, "request failed: {err}"),
            SyncError::Rejected { status, message } => {
                write!(f, "server rejected save ({status}): {message}")
            }
            SyncError::MissingBootstrap => f.write_str("page has no embedded expenses"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Http(err)
    }
}

/// Outcome of one background push. `revision` counts mutations in the
/// session, so a subscriber can tell which snapshot an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Saved { revision: u64, count: usize },
    Failed { revision: u64, message: String },
}

#[derive(Debug, Clone)]
pub struct SyncClient {
    http: Client,
    base_url: String,
}

impl SyncClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the page and decodes the collection embedded in it.
    pub async fn bootstrap(&self) -> Result<Vec<Expense>, SyncError> {
        let html = self
            .http
            .get(format!("{}/", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let embedded = extract_embedded(&html).ok_or(SyncError::MissingBootstrap)?;
        Ok(decode_collection(embedded))
    }

    /// Sends the whole collection to the save endpoint.
    pub async fn push(&self, expenses: &[Expense]) -> Result<SaveAck, SyncError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, SAVE_PATH))
            .json(expenses)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<SaveAck>().await?);
        }

        let message = match response.json::<SaveAck>().await {
            Ok(ack) => ack.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(SyncError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// One user's working session. Mutations apply locally at once; each is
/// followed by a detached push whose result is logged and broadcast.
///
/// Pushes are never awaited by later mutations and may complete out of
/// order; the server keeps whichever write lands last.
pub struct Session {
    tracker: Tracker,
    client: Arc<SyncClient>,
    events: broadcast::Sender<SyncEvent>,
    revision: u64,
}

impl Session {
    pub fn new(tracker: Tracker, client: SyncClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tracker,
            client: Arc::new(client),
            events,
            revision: 0,
        }
    }

    pub async fn connect(client: SyncClient) -> Result<Self, SyncError> {
        let expenses = client.bootstrap().await?;
        info!(count = expenses.len(), url = client.base_url(), "session bootstrapped");
        Ok(Self::new(Tracker::new(expenses), client))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn page(&self) -> Page {
        Page::render(self.tracker.expenses())
    }

    /// Must be called from within a tokio runtime.
    pub fn add(&mut self, form: &ExpenseForm) -> Result<String, FormError> {
        let id = match self.tracker.add(form) {
            Ok(expense) => expense.id.clone(),
            Err(err) => {
                warn!("expense not added: {err}");
                return Err(err);
            }
        };
        self.persist();
        Ok(id)
    }

    /// Must be called from within a tokio runtime.
    pub fn delete(&mut self, id: &str) -> Option<Expense> {
        let removed = self.tracker.delete(id);
        self.persist();
        removed
    }

    /// Spawns a push of the current snapshot.
    pub fn persist(&mut self) -> JoinHandle<()> {
        self.revision += 1;
        let revision = self.revision;
        let snapshot = self.tracker.expenses().to_vec();
        let client = Arc::clone(&self.client);
        let events = self.events.clone();

        tokio::spawn(async move {
            let event = match client.push(&snapshot).await {
                Ok(_) => {
                    info!(revision, count = snapshot.len(), "expenses pushed");
                    SyncEvent::Saved {
                        revision,
                        count: snapshot.len(),
                    }
                }
                Err(err) => {
                    warn!(revision, "failed to push expenses: {err}");
                    SyncEvent::Failed {
                        revision,
                        message: err.to_string(),
                    }
                }
            };
            // No subscribers is fine.
            let _ = events.send(event);
        })
    }
}
