use crate::error::ScpiError;
use crate::status::QuestionableStatus;
use crate::transport::TransportHandle;

/// Questionable status register group
#[derive(Debug, Clone)]
pub struct Status {
    transport: TransportHandle,
}

impl Status {
    pub(crate) fn new(transport: TransportHandle) -> Self {
        Self { transport }
    }

    /// Live condition, not latched
    pub fn questionable_condition(&self) -> Result<QuestionableStatus, ScpiError> {
        self.transport.query_as(":STAT:QUES:COND?")
    }

    /// Latched events; reading clears the register
    pub fn questionable_event(&self) -> Result<QuestionableStatus, ScpiError> {
        self.transport.query_as(":STAT:QUES:EVEN?")
    }

    pub fn set_questionable_enable(&self, mask: QuestionableStatus) -> Result<(), ScpiError> {
        self.transport
            .send(&format!(":STAT:QUES:ENAB {}", mask.bits()))
    }

    pub fn questionable_enable(&self) -> Result<QuestionableStatus, ScpiError> {
        self.transport.query_as(":STAT:QUES:ENAB?")
    }

    pub fn preset(&self) -> Result<(), ScpiError> {
        self.transport.send(":STAT:PRES")
    }
}
