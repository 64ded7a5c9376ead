use serde::{Deserialize, Serialize};

use super::ScopeChannel;
use crate::error::ScpiError;
use crate::protocol::{Protocol, Token};
use crate::transport::TransportHandle;

/// Replies at or above this value mean the measurement is not available
pub const INVALID_MEASUREMENT: f64 = 9.9e37;

/// Automatic measurement parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureItem {
    VMax,
    VMin,
    VPeakToPeak,
    VTop,
    VBase,
    VAmplitude,
    VAverage,
    VRms,
    Overshoot,
    Preshoot,
    Period,
    Frequency,
    RiseTime,
    FallTime,
    PositiveWidth,
    NegativeWidth,
    PositiveDuty,
    NegativeDuty,
}

impl Token for MeasureItem {
    const FIELD: &'static str = "measure item";

    fn token(self) -> &'static str {
        match self {
            MeasureItem::VMax => "VMAX",
            MeasureItem::VMin => "VMIN",
            MeasureItem::VPeakToPeak => "VPP",
            MeasureItem::VTop => "VTOP",
            MeasureItem::VBase => "VBAS",
            MeasureItem::VAmplitude => "VAMP",
            MeasureItem::VAverage => "VAVG",
            MeasureItem::VRms => "VRMS",
            MeasureItem::Overshoot => "OVER",
            MeasureItem::Preshoot => "PRES",
            MeasureItem::Period => "PER",
            MeasureItem::Frequency => "FREQ",
            MeasureItem::RiseTime => "RTIM",
            MeasureItem::FallTime => "FTIM",
            MeasureItem::PositiveWidth => "PWID",
            MeasureItem::NegativeWidth => "NWID",
            MeasureItem::PositiveDuty => "PDUT",
            MeasureItem::NegativeDuty => "NDUT",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "VMAX" => Some(MeasureItem::VMax),
            "VMIN" => Some(MeasureItem::VMin),
            "VPP" => Some(MeasureItem::VPeakToPeak),
            "VTOP" => Some(MeasureItem::VTop),
            "VBAS" | "VBASE" => Some(MeasureItem::VBase),
            "VAMP" => Some(MeasureItem::VAmplitude),
            "VAVG" => Some(MeasureItem::VAverage),
            "VRMS" => Some(MeasureItem::VRms),
            "OVER" | "OVERSHOOT" => Some(MeasureItem::Overshoot),
            "PRES" | "PRESHOOT" => Some(MeasureItem::Preshoot),
            "PER" | "PERIOD" => Some(MeasureItem::Period),
            "FREQ" | "FREQUENCY" => Some(MeasureItem::Frequency),
            "RTIM" | "RTIME" => Some(MeasureItem::RiseTime),
            "FTIM" | "FTIME" => Some(MeasureItem::FallTime),
            "PWID" | "PWIDTH" => Some(MeasureItem::PositiveWidth),
            "NWID" | "NWIDTH" => Some(MeasureItem::NegativeWidth),
            "PDUT" | "PDUTY" => Some(MeasureItem::PositiveDuty),
            "NDUT" | "NDUTY" => Some(MeasureItem::NegativeDuty),
            _ => None,
        }
    }
}

/// Automatic measurements
#[derive(Debug, Clone)]
pub struct Measure {
    transport: TransportHandle,
}

impl Measure {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Value of `item` on `channel`, `None` when the scope cannot measure it
    pub fn item(&self, item: MeasureItem, channel: ScopeChannel) -> Result<Option<f64>, ScpiError> {
        let value = self.transport.query_with(
            &format!(":MEAS:ITEM? {},{}", item.token(), channel.token()),
            Protocol::float_reply,
        )?;
        Ok((value.abs() < INVALID_MEASUREMENT).then_some(value))
    }

    pub fn frequency(&self, channel: ScopeChannel) -> Result<Option<f64>, ScpiError> {
        self.item(MeasureItem::Frequency, channel)
    }

    pub fn peak_to_peak(&self, channel: ScopeChannel) -> Result<Option<f64>, ScpiError> {
        self.item(MeasureItem::VPeakToPeak, channel)
    }

    pub fn rms(&self, channel: ScopeChannel) -> Result<Option<f64>, ScpiError> {
        self.item(MeasureItem::VRms, channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_item_query() {
        let mock = MockTransport::new()
            .with_reply(":MEAS:ITEM? FREQ,CHAN1", "1.000000e+03")
            .with_reply(":MEAS:ITEM? VPP,CHAN2", "9.9E37");
        let measure = Measure::new(TransportHandle::new(mock));
        assert_eq!(measure.frequency(ScopeChannel::Ch1).unwrap(), Some(1000.0));
        assert_eq!(measure.peak_to_peak(ScopeChannel::Ch2).unwrap(), None);
    }

    #[test]
    fn test_item_parse_failure_is_reported() {
        let mock = MockTransport::new().with_reply(":MEAS:ITEM? VRMS,CHAN3", "****");
        let measure = Measure::new(TransportHandle::new(mock));
        assert!(matches!(
            measure.rms(ScopeChannel::Ch3),
            Err(ScpiError::Parse(_))
        ));
    }
}
