//! Rigol DS1000Z series digital oscilloscope

mod acquire;
mod channel;
mod measure;
mod timebase;
mod trigger;
mod waveform;

pub use acquire::{Acquire, AcquireType, MAX_AVERAGES, MIN_AVERAGES};
pub use channel::{Channel, Coupling, PROBE_RATIOS, ScopeChannel};
pub use measure::{INVALID_MEASUREMENT, Measure, MeasureItem};
pub use timebase::Timebase;
pub use trigger::{Trigger, TriggerSlope, TriggerStatus, TriggerSweep};
pub use waveform::Waveform;

use super::{Common, Instrument};
use crate::transport::TransportHandle;
use crate::types::InstrumentType;

#[derive(Debug, Clone)]
pub struct Ds1000z {
    pub common: Common,
    pub channel: Channel,
    pub timebase: Timebase,
    pub trigger: Trigger,
    pub acquire: Acquire,
    pub waveform: Waveform,
    pub measure: Measure,
}

impl Ds1000z {
    pub const MODEL: &'static str = "DS1000Z";

    pub fn new(transport: TransportHandle) -> Self {
        Self {
            common: Common::new(transport.clone()),
            channel: Channel::new(transport.clone()),
            timebase: Timebase::new(transport.clone()),
            trigger: Trigger::new(transport.clone()),
            acquire: Acquire::new(transport.clone()),
            waveform: Waveform::new(transport.clone()),
            measure: Measure::new(transport),
        }
    }
}

impl Instrument for Ds1000z {
    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Oscilloscope
    }

    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn common(&self) -> &Common {
        &self.common
    }
}
