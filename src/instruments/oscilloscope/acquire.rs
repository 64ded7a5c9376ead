use serde::{Deserialize, Serialize};

use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;

pub const MIN_AVERAGES: u32 = 2;
pub const MAX_AVERAGES: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquireType {
    Normal,
    Average,
    Peak,
    HighResolution,
}

impl Token for AcquireType {
    const FIELD: &'static str = "acquire type";

    fn token(self) -> &'static str {
        match self {
            AcquireType::Normal => "NORM",
            AcquireType::Average => "AVER",
            AcquireType::Peak => "PEAK",
            AcquireType::HighResolution => "HRES",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "NORM" | "NORMAL" => Some(AcquireType::Normal),
            "AVER" | "AVERAGES" => Some(AcquireType::Average),
            "PEAK" => Some(AcquireType::Peak),
            "HRES" | "HRESOLUTION" => Some(AcquireType::HighResolution),
            _ => None,
        }
    }
}

/// Run control and acquisition setup
#[derive(Debug, Clone)]
pub struct Acquire {
    transport: TransportHandle,
}

impl Acquire {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn run(&self) -> Result<(), ScpiError> {
        self.transport.send(":RUN")
    }

    pub fn stop(&self) -> Result<(), ScpiError> {
        self.transport.send(":STOP")
    }

    /// Arm a single acquisition
    pub fn single(&self) -> Result<(), ScpiError> {
        self.transport.send(":SING")
    }

    pub fn autoscale(&self) -> Result<(), ScpiError> {
        self.transport.send(":AUT")
    }

    pub fn set_type(&self, acquire_type: AcquireType) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":ACQ:TYPE {}", acquire_type.token()))
    }

    pub fn acquire_type(&self) -> Result<AcquireType, ScpiError> {
        self.transport.query_with(":ACQ:TYPE?", Protocol::token_reply)
    }

    /// Number of averages in average mode: a power of two from 2 to 1024
    pub fn set_averages(&self, count: u32) -> Result<(), ScpiError> {
        if !count.is_power_of_two() || !(MIN_AVERAGES..=MAX_AVERAGES).contains(&count) {
            return Err(ScpiError::InvalidParameter(format!(
                "averages must be a power of two within {MIN_AVERAGES}..={MAX_AVERAGES}, got {count}"
            )));
        }
        self.transport.send(&format!(":ACQ:AVER {count}"))
    }

    pub fn averages(&self) -> Result<u32, ScpiError> {
        self.transport.query_with(":ACQ:AVER?", Protocol::int_reply)
    }
}
