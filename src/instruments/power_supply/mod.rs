//! Rigol DP800 series programmable DC power supply

mod measure;
mod output;
mod source;

pub use measure::Measure;
pub use output::{Output, OutputMode, Protection};
pub use source::Source;

use super::{Common, Instrument};
use crate::transport::TransportHandle;
use crate::types::InstrumentType;

#[derive(Debug, Clone)]
pub struct Dp800 {
    pub common: Common,
    pub source: Source,
    pub output: Output,
    pub measure: Measure,
}

impl Dp800 {
    pub const MODEL: &'static str = "DP800";

    pub fn new(transport: TransportHandle) -> Self {
        Self {
            common: Common::new(transport.clone()),
            source: Source::new(transport.clone()),
            output: Output::new(transport.clone()),
            measure: Measure::new(transport),
        }
    }
}

impl Instrument for Dp800 {
    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::PowerSupply
    }

    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn common(&self) -> &Common {
        &self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use crate::types::OutputChannel;

    #[test]
    fn test_subsystems_share_one_transport() {
        let mock = MockTransport::new()
            .with_reply("*OPC?", "1")
            .with_reply(":MEAS:ALL? CH1", "5.000,0.100,0.500");
        let psu = Dp800::new(TransportHandle::new(mock.clone()));

        psu.source.apply(OutputChannel::Ch1, 5.0, 0.5).unwrap();
        psu.output.set_enabled(OutputChannel::Ch1, true).unwrap();
        assert!(psu.common.operation_complete().unwrap());
        psu.measure.all(OutputChannel::Ch1).unwrap();

        assert_eq!(
            mock.sent(),
            vec![
                ":APPL CH1,5.000,0.500",
                ":OUTP:STAT CH1,ON",
                "*OPC?",
                ":MEAS:ALL? CH1"
            ]
        );
    }
}
