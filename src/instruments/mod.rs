//! Instrument facades and their command subsystems.
//!
//! A facade is constructed once per connection from a [`TransportHandle`]. It builds
//! each of its subsystems exactly once, hands every one of them a clone of the handle,
//! and exposes them as public fields. Facades perform no I/O of their own.
//!
//! ```
//! use rusty_scpi::instruments::{Dp800, Instrument};
//! use rusty_scpi::transport::{MockTransport, TransportHandle};
//! use rusty_scpi::OutputChannel;
//!
//! let mock = MockTransport::new().with_reply(":MEAS:ALL? CH1", "5.000,0.200,1.000");
//! let psu = Dp800::new(TransportHandle::new(mock.clone()));
//!
//! psu.source.apply(OutputChannel::Ch1, 5.0, 0.5)?;
//! psu.output.set_enabled(OutputChannel::Ch1, true)?;
//! let reading = psu.measure.all(OutputChannel::Ch1)?;
//!
//! assert_eq!(reading.power, 1.0);
//! assert_eq!(mock.sent()[0], ":APPL CH1,5.000,0.500");
//! # Ok::<(), rusty_scpi::ScpiError>(())
//! ```

use crate::error::ScpiError;
use crate::transport::TransportHandle;
use crate::types::InstrumentType;

pub mod common;
pub mod lcr_meter;
pub mod load;
pub mod oscilloscope;
pub mod power_supply;

pub use common::Common;
pub use lcr_meter::E4980a;
pub use load::Dl3000;
pub use oscilloscope::Ds1000z;
pub use power_supply::Dp800;

/// Operations shared by every facade
pub trait Instrument {
    fn instrument_type(&self) -> InstrumentType;

    fn model(&self) -> &'static str;

    /// IEEE 488.2 common commands
    fn common(&self) -> &Common;
}

/// Build the facade matching `instrument_type`
pub fn connect(instrument_type: InstrumentType, transport: TransportHandle) -> Box<dyn Instrument> {
    match instrument_type {
        InstrumentType::LcrMeter => Box::new(E4980a::new(transport)),
        InstrumentType::Load => Box::new(Dl3000::new(transport)),
        InstrumentType::Oscilloscope => Box::new(Ds1000z::new(transport)),
        InstrumentType::PowerSupply => Box::new(Dp800::new(transport)),
    }
}

/// Reject `value` outside `min..=max` before anything is sent. NaN is always rejected.
pub(crate) fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ScpiError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ScpiError::InvalidParameter(format!(
            "{name} must be within {min}..={max}, got {value}"
        )))
    }
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<(), ScpiError> {
    check_range(name, value, 0.0, f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_connect_builds_matching_facade() {
        for kind in [
            InstrumentType::LcrMeter,
            InstrumentType::Load,
            InstrumentType::Oscilloscope,
            InstrumentType::PowerSupply,
        ] {
            let instrument = connect(kind, TransportHandle::new(MockTransport::new()));
            assert_eq!(instrument.instrument_type(), kind);
            assert!(!instrument.model().is_empty());
        }
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("level", 1.0, 0.0, 2.0).is_ok());
        assert!(check_range("level", 2.0, 0.0, 2.0).is_ok());
        assert!(matches!(
            check_range("level", 2.5, 0.0, 2.0),
            Err(ScpiError::InvalidParameter(_))
        ));
        assert!(check_range("level", f64::NAN, 0.0, 2.0).is_err());
        assert!(check_non_negative("current", -0.1).is_err());
        assert!(check_non_negative("current", f64::INFINITY).is_err());
    }

    #[test]
    fn test_facades_do_not_share_transports() {
        let first = MockTransport::new().with_reply("*OPC?", "1");
        let second = MockTransport::new().with_reply("*OPC?", "1");
        let psu = Dp800::new(TransportHandle::new(first.clone()));
        let load = Dl3000::new(TransportHandle::new(second.clone()));

        assert!(psu.common().operation_complete().unwrap());
        assert_eq!(first.sent(), vec!["*OPC?"]);
        assert!(second.sent().is_empty());
        assert!(load.common().operation_complete().unwrap());
        assert_eq!(second.sent(), vec!["*OPC?"]);
    }
}
