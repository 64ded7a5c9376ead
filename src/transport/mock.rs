use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::Transport;
use crate::error::TransportError;

#[derive(Debug, Default)]
struct MockState {
    replies: HashMap<String, VecDeque<String>>,
    failures: HashSet<String>,
    sent: Vec<String>,
}

/// In-memory transport with scripted replies.
///
/// Every command, query or not, is recorded in order. Clones share the same script and
/// log, so a test can keep one clone and hand the other to a facade.
///
/// # Examples
/// ```
/// use rusty_scpi::transport::{MockTransport, TransportHandle};
///
/// let mock = MockTransport::new().with_reply("*OPC?", "1");
/// let handle = TransportHandle::new(mock.clone());
///
/// handle.send("*CLS")?;
/// assert_eq!(handle.query("*OPC?")?, "1");
/// assert_eq!(mock.sent(), vec!["*CLS", "*OPC?"]);
/// # Ok::<(), rusty_scpi::ScpiError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `query`. Several replies for the same query are returned in order.
    pub fn with_reply(self, query: &str, reply: &str) -> Self {
        self.push_reply(query, reply);
        self
    }

    /// Make every exchange with `command` fail
    pub fn with_failure(self, command: &str) -> Self {
        self.state.lock().failures.insert(command.to_string());
        self
    }

    pub fn push_reply(&self, query: &str, reply: &str) {
        self.state
            .lock()
            .replies
            .entry(query.to_string())
            .or_default()
            .push_back(reply.to_string());
    }

    /// Commands received so far
    pub fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    pub fn last_sent(&self) -> Option<String> {
        self.state.lock().sent.last().cloned()
    }

    /// True when every scripted reply was consumed
    pub fn is_exhausted(&self) -> bool {
        self.state.lock().replies.values().all(VecDeque::is_empty)
    }

    fn record(&self, command: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.sent.push(command.to_string());
        if state.failures.contains(command) {
            return Err(TransportError::Other(format!(
                "injected failure for {command}"
            )));
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
        self.record(command)
    }

    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        self.record(command)?;
        self.state
            .lock()
            .replies
            .get_mut(command)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| TransportError::Other(format!("no reply scripted for {command}")))
    }
}
