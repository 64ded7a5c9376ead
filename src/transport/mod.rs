use log::debug;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ParseError, ScpiError, TransportError};

pub mod mock;
pub mod socket;

pub use mock::MockTransport;
pub use socket::{ConnectionConfig, SocketTransport, SocketTransportBuilder};

/// Line-oriented link to one instrument.
///
/// Implementations own framing: commands are sent without terminator and replies are
/// returned without terminator. Exactly one reply line is expected per query.
pub trait Transport: Send {
    fn send_command(&mut self, command: &str) -> Result<(), TransportError>;

    fn query(&mut self, command: &str) -> Result<String, TransportError>;
}

/// Shared handle to the transport of one instrument.
///
/// Every subsystem of a facade holds a clone. The lock is held for a whole
/// command/reply exchange, so requests through different subsystems never interleave.
#[derive(Clone)]
pub struct TransportHandle {
    inner: Arc<Mutex<dyn Transport>>,
}

impl TransportHandle {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    /// Send a command that produces no reply
    pub fn send(&self, command: &str) -> Result<(), ScpiError> {
        debug!("-> {command}");
        self.inner.lock().send_command(command)?;
        Ok(())
    }

    /// Send a query and return the raw reply line
    pub fn query(&self, command: &str) -> Result<String, ScpiError> {
        debug!("-> {command}");
        let reply = self.inner.lock().query(command)?;
        debug!("<- {reply}");
        Ok(reply)
    }

    /// Send a query and parse the reply into `T`
    pub fn query_as<T>(&self, command: &str) -> Result<T, ScpiError>
    where
        T: FromStr<Err = ParseError>,
    {
        let reply = self.query(command)?;
        Ok(reply.parse()?)
    }

    /// Send a query and parse the reply with `parse`
    pub fn query_with<T>(
        &self,
        command: &str,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, ScpiError> {
        let reply = self.query(command)?;
        Ok(parse(&reply)?)
    }

    /// True when both handles reach the same transport
    pub fn same_transport(&self, other: &TransportHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportHandle")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Protocol;
    use crate::types::OutputReading;

    #[test]
    fn test_query_as_parses_reply() {
        let mock = MockTransport::new().with_reply(":MEAS:ALL? CH1", "5.000,1.000,5.000");
        let handle = TransportHandle::new(mock.clone());

        let reading: OutputReading = handle.query_as(":MEAS:ALL? CH1").unwrap();
        assert_eq!(reading.power, 5.0);
        assert_eq!(mock.sent(), vec![":MEAS:ALL? CH1"]);
    }

    #[test]
    fn test_parse_failure_is_not_coerced() {
        let mock = MockTransport::new().with_reply(":MEAS:VOLT?", "");
        let handle = TransportHandle::new(mock);

        let result = handle.query_with(":MEAS:VOLT?", Protocol::float_reply);
        assert!(matches!(
            result,
            Err(ScpiError::Parse(ParseError::EmptyReply))
        ));
    }

    #[test]
    fn test_transport_errors_propagate_unchanged() {
        let mock = MockTransport::new().with_failure("*RST");
        let handle = TransportHandle::new(mock);

        assert!(matches!(
            handle.send("*RST"),
            Err(ScpiError::Transport(TransportError::Other(_)))
        ));
    }

    #[test]
    fn test_clones_share_transport() {
        let handle = TransportHandle::new(MockTransport::new());
        let other = handle.clone();
        assert!(handle.same_transport(&other));
        assert!(!handle.same_transport(&TransportHandle::new(MockTransport::new())));
    }
}
