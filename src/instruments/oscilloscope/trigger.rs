use serde::{Deserialize, Serialize};

use super::ScopeChannel;
use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSweep {
    Auto,
    Normal,
    Single,
}

impl Token for TriggerSweep {
    const FIELD: &'static str = "trigger sweep";

    fn token(self) -> &'static str {
        match self {
            TriggerSweep::Auto => "AUTO",
            TriggerSweep::Normal => "NORM",
            TriggerSweep::Single => "SING",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "AUTO" => Some(TriggerSweep::Auto),
            "NORM" | "NORMAL" => Some(TriggerSweep::Normal),
            "SING" | "SINGLE" => Some(TriggerSweep::Single),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSlope {
    Positive,
    Negative,
    Either,
}

impl Token for TriggerSlope {
    const FIELD: &'static str = "trigger slope";

    fn token(self) -> &'static str {
        match self {
            TriggerSlope::Positive => "POS",
            TriggerSlope::Negative => "NEG",
            TriggerSlope::Either => "RFAL",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "POS" | "POSITIVE" => Some(TriggerSlope::Positive),
            "NEG" | "NEGATIVE" => Some(TriggerSlope::Negative),
            "RFAL" | "RFALL" => Some(TriggerSlope::Either),
            _ => None,
        }
    }
}

/// State of the trigger system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerStatus {
    Triggered,
    Waiting,
    Running,
    Auto,
    Stopped,
}

impl Token for TriggerStatus {
    const FIELD: &'static str = "trigger status";

    fn token(self) -> &'static str {
        match self {
            TriggerStatus::Triggered => "TD",
            TriggerStatus::Waiting => "WAIT",
            TriggerStatus::Running => "RUN",
            TriggerStatus::Auto => "AUTO",
            TriggerStatus::Stopped => "STOP",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" => Some(TriggerStatus::Triggered),
            "WAIT" => Some(TriggerStatus::Waiting),
            "RUN" => Some(TriggerStatus::Running),
            "AUTO" => Some(TriggerStatus::Auto),
            "STOP" => Some(TriggerStatus::Stopped),
            _ => None,
        }
    }
}

/// Edge trigger setup (`:TRIGger` subsystem)
#[derive(Debug, Clone)]
pub struct Trigger {
    transport: TransportHandle,
}

impl Trigger {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Select the edge trigger type
    pub fn select_edge(&self) -> Result<(), ScpiError> {
        self.transport.send(":TRIG:MODE EDGE")
    }

    pub fn set_sweep(&self, sweep: TriggerSweep) -> Result<(), ScpiError> {
        self.transport.send(&format!(":TRIG:SWE {}", sweep.token()))
    }

    pub fn sweep(&self) -> Result<TriggerSweep, ScpiError> {
        self.transport.query_with(":TRIG:SWE?", Protocol::token_reply)
    }

    pub fn set_edge_source(&self, channel: ScopeChannel) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":TRIG:EDG:SOUR {}", channel.token()))
    }

    pub fn edge_source(&self) -> Result<ScopeChannel, ScpiError> {
        self.transport
            .query_with(":TRIG:EDG:SOUR?", Protocol::token_reply)
    }

    pub fn set_edge_slope(&self, slope: TriggerSlope) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":TRIG:EDG:SLOP {}", slope.token()))
    }

    pub fn edge_slope(&self) -> Result<TriggerSlope, ScpiError> {
        self.transport
            .query_with(":TRIG:EDG:SLOP?", Protocol::token_reply)
    }

    /// Trigger level in volts
    pub fn set_edge_level(&self, volts: f64) -> Result<(), ScpiError> {
        if !volts.is_finite() {
            return Err(ScpiError::InvalidParameter(format!(
                "trigger level must be finite, got {volts}"
            )));
        }
        self.transport.send(&format!(":TRIG:EDG:LEV {volts}"))
    }

    pub fn edge_level(&self) -> Result<f64, ScpiError> {
        self.transport
            .query_with(":TRIG:EDG:LEV?", Protocol::float_reply)
    }

    pub fn status(&self) -> Result<TriggerStatus, ScpiError> {
        self.transport.query_with(":TRIG:STAT?", Protocol::token_reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_edge_setup() {
        let mock = MockTransport::new();
        let trigger = Trigger::new(TransportHandle::new(mock.clone()));
        trigger.select_edge().unwrap();
        trigger.set_edge_source(ScopeChannel::Ch1).unwrap();
        trigger.set_edge_slope(TriggerSlope::Either).unwrap();
        trigger.set_edge_level(1.5).unwrap();
        trigger.set_sweep(TriggerSweep::Single).unwrap();
        assert_eq!(
            mock.sent(),
            vec![
                ":TRIG:MODE EDGE",
                ":TRIG:EDG:SOUR CHAN1",
                ":TRIG:EDG:SLOP RFAL",
                ":TRIG:EDG:LEV 1.5",
                ":TRIG:SWE SING"
            ]
        );
    }

    #[test]
    fn test_trigger_queries() {
        let mock = MockTransport::new()
            .with_reply(":TRIG:STAT?", "WAIT")
            .with_reply(":TRIG:EDG:SOUR?", "CHAN3")
            .with_reply(":TRIG:EDG:SLOP?", "NEG")
            .with_reply(":TRIG:SWE?", "NORMal");
        let trigger = Trigger::new(TransportHandle::new(mock));
        assert_eq!(trigger.status().unwrap(), TriggerStatus::Waiting);
        assert_eq!(trigger.edge_source().unwrap(), ScopeChannel::Ch3);
        assert_eq!(trigger.edge_slope().unwrap(), TriggerSlope::Negative);
        assert_eq!(trigger.sweep().unwrap(), TriggerSweep::Normal);
    }
}
