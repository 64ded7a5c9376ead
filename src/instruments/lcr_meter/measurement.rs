use serde::{Deserialize, Serialize};

use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;
use crate::types::ImpedanceReading;

/// Where a measurement trigger comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSource {
    Internal,
    Hold,
    External,
    Bus,
}

impl Token for TriggerSource {
    const FIELD: &'static str = "trigger source";

    fn token(self) -> &'static str {
        match self {
            TriggerSource::Internal => "INT",
            TriggerSource::Hold => "HOLD",
            TriggerSource::External => "EXT",
            TriggerSource::Bus => "BUS",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "INT" | "INTERNAL" => Some(TriggerSource::Internal),
            "HOLD" | "MAN" | "MANUAL" => Some(TriggerSource::Hold),
            "EXT" | "EXTERNAL" => Some(TriggerSource::External),
            "BUS" => Some(TriggerSource::Bus),
            _ => None,
        }
    }
}

/// Triggering and result retrieval
#[derive(Debug, Clone)]
pub struct Measurement {
    transport: TransportHandle,
}

impl Measurement {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn set_trigger_source(&self, source: TriggerSource) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":TRIG:SOUR {}", source.token()))
    }

    pub fn trigger_source(&self) -> Result<TriggerSource, ScpiError> {
        self.transport.query_with(":TRIG:SOUR?", Protocol::token_reply)
    }

    /// Fire one trigger
    pub fn trigger(&self) -> Result<(), ScpiError> {
        self.transport.send(":TRIG:IMM")
    }

    /// Re-arm automatically after every measurement
    pub fn set_continuous(&self, enabled: bool) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":INIT:CONT {}", Protocol::on_off(enabled)))
    }

    pub fn continuous(&self) -> Result<bool, ScpiError> {
        self.transport.query_with(":INIT:CONT?", Protocol::bool_reply)
    }

    /// Arm the trigger system once
    pub fn initiate(&self) -> Result<(), ScpiError> {
        self.transport.send(":INIT:IMM")
    }

    /// Most recent result
    pub fn fetch(&self) -> Result<ImpedanceReading, ScpiError> {
        self.transport.query_as(":FETC:IMP:FORM?")
    }

    /// Trigger a measurement and fetch its result.
    ///
    /// Expects the bus trigger source with the trigger system armed.
    pub fn trigger_and_fetch(&self) -> Result<ImpedanceReading, ScpiError> {
        self.trigger()?;
        self.fetch()
    }
}
