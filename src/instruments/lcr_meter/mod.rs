//! Keysight E4980A precision LCR meter

mod bias;
mod correction;
mod display;
mod function;
mod measurement;

pub use bias::{Bias, MAX_BIAS_CURRENT, MAX_BIAS_VOLTAGE};
pub use correction::{CableLength, Correction};
pub use display::{Display, DisplayPage, MAX_LINE_LENGTH};
pub use function::{Function, ImpedanceFunction, MAX_FREQUENCY, MIN_FREQUENCY};
pub use measurement::{Measurement, TriggerSource};

use super::{Common, Instrument};
use crate::transport::TransportHandle;
use crate::types::InstrumentType;

#[derive(Debug, Clone)]
pub struct E4980a {
    pub common: Common,
    pub bias: Bias,
    pub correction: Correction,
    pub display: Display,
    pub function: Function,
    pub measurement: Measurement,
}

impl E4980a {
    pub const MODEL: &'static str = "E4980A";

    pub fn new(transport: TransportHandle) -> Self {
        Self {
            common: Common::new(transport.clone()),
            bias: Bias::new(transport.clone()),
            correction: Correction::new(transport.clone()),
            display: Display::new(transport.clone()),
            function: Function::new(transport.clone()),
            measurement: Measurement::new(transport),
        }
    }
}

impl Instrument for E4980a {
    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::LcrMeter
    }

    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn common(&self) -> &Common {
        &self.common
    }
}
