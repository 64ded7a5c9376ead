use crate::error::ScpiError;
use crate::protocol::Protocol;
use crate::transport::TransportHandle;
use crate::types::OutputReading;

/// Input readback (`:MEASure` subsystem)
#[derive(Debug, Clone)]
pub struct Measure {
    transport: TransportHandle,
}

impl Measure {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    pub fn voltage(&self) -> Result<f64, ScpiError> {
        self.transport.query_with(":MEAS:VOLT?", Protocol::float_reply)
    }

    pub fn current(&self) -> Result<f64, ScpiError> {
        self.transport.query_with(":MEAS:CURR?", Protocol::float_reply)
    }

    pub fn power(&self) -> Result<f64, ScpiError> {
        self.transport.query_with(":MEAS:POW?", Protocol::float_reply)
    }

    pub fn resistance(&self) -> Result<f64, ScpiError> {
        self.transport.query_with(":MEAS:RES?", Protocol::float_reply)
    }

    /// Voltage, current and power, queried in that order
    pub fn reading(&self) -> Result<OutputReading, ScpiError> {
        Ok(OutputReading {
            voltage: self.voltage()?,
            current: self.current()?,
            power: self.power()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_reading_queries_in_order() {
        let mock = MockTransport::new()
            .with_reply(":MEAS:VOLT?", "12.001000")
            .with_reply(":MEAS:CURR?", "0.999800")
            .with_reply(":MEAS:POW?", "11.998600");
        let measure = Measure::new(TransportHandle::new(mock.clone()));

        let reading = measure.reading().unwrap();
        assert_eq!(reading.voltage, 12.001);
        assert_eq!(reading.current, 0.9998);
        assert_eq!(mock.sent(), vec![":MEAS:VOLT?", ":MEAS:CURR?", ":MEAS:POW?"]);
    }

    #[test]
    fn test_resistance() {
        let mock = MockTransport::new().with_reply(":MEAS:RES?", "1.200000E+01");
        let measure = Measure::new(TransportHandle::new(mock));
        assert_eq!(measure.resistance().unwrap(), 12.0);
    }
}
