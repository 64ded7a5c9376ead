//! Rigol DL3000 series DC electronic load

mod input;
mod measure;
mod source;
mod status;

pub use input::Input;
pub use measure::Measure;
pub use source::{Dl3000Range, FunctionMode, Source, SourceFunction, TransientMode};
pub use status::Status;

use super::{Common, Instrument};
use crate::transport::TransportHandle;
use crate::types::InstrumentType;

#[derive(Debug, Clone)]
pub struct Dl3000 {
    pub common: Common,
    pub source: Source,
    pub input: Input,
    pub measure: Measure,
    pub status: Status,
}

impl Dl3000 {
    pub const MODEL: &'static str = "DL3000";

    pub fn new(transport: TransportHandle) -> Self {
        Self {
            common: Common::new(transport.clone()),
            source: Source::new(transport.clone()),
            input: Input::new(transport.clone()),
            measure: Measure::new(transport.clone()),
            status: Status::new(transport),
        }
    }
}

impl Instrument for Dl3000 {
    fn instrument_type(&self) -> InstrumentType {
        InstrumentType::Load
    }

    fn model(&self) -> &'static str {
        Self::MODEL
    }

    fn common(&self) -> &Common {
        &self.common
    }
}
