use crate::{
    connection::{IpmiCommand, Request},
    fmt::LogItem,
    log_vec, Loggable,
};

use super::{request, strip_identifier, PicmgError};

/// Acknowledgement of a FRU command, which only returns the PICMG
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FruAck {
    pub command: &'static str,
    pub fru_id: u8,
}

impl Loggable for FruAck {
    fn as_log(&self) -> Vec<LogItem> {
        log_vec![(0, self.command), (1, "FRU device ID", self.fru_id)]
    }
}

/// The Set FRU Activation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetFruActivation {
    fru_id: u8,
    activate: bool,
}

impl SetFruActivation {
    pub const CMD: u8 = 0x0C;

    pub fn new(fru_id: u8, activate: bool) -> Self {
        Self { fru_id, activate }
    }
}

impl From<SetFruActivation> for Request {
    fn from(value: SetFruActivation) -> Self {
        request(
            SetFruActivation::CMD,
            &[value.fru_id, u8::from(value.activate)],
        )
    }
}

impl IpmiCommand for SetFruActivation {
    type Output = ();

    type Error = PicmgError;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        strip_identifier(data).map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruControlOption {
    ColdReset,
    WarmReset,
    GracefulReboot,
    DiagnosticInterrupt,
}

impl TryFrom<u8> for FruControlOption {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let value = match value {
            0x00 => Self::ColdReset,
            0x01 => Self::WarmReset,
            0x02 => Self::GracefulReboot,
            0x03 => Self::DiagnosticInterrupt,
            _ => return Err(()),
        };

        Ok(value)
    }
}

impl From<FruControlOption> for u8 {
    fn from(value: FruControlOption) -> Self {
        match value {
            FruControlOption::ColdReset => 0x00,
            FruControlOption::WarmReset => 0x01,
            FruControlOption::GracefulReboot => 0x02,
            FruControlOption::DiagnosticInterrupt => 0x03,
        }
    }
}

/// The FRU Control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FruControl {
    fru_id: u8,
    option: FruControlOption,
}

impl FruControl {
    pub const CMD: u8 = 0x04;

    pub fn new(fru_id: u8, option: FruControlOption) -> Self {
        Self { fru_id, option }
    }
}

impl From<FruControl> for Request {
    fn from(value: FruControl) -> Self {
        request(FruControl::CMD, &[value.fru_id, value.option.into()])
    }
}

impl IpmiCommand for FruControl {
    type Output = ();

    type Error = PicmgError;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        strip_identifier(data).map(|_| ())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn requests() {
        let activate: Request = SetFruActivation::new(3, true).into();
        assert_eq!(activate.as_bytes(), &[0xB0, 0x0C, 0x00, 0x03, 0x01]);

        let reboot: Request = FruControl::new(0, FruControlOption::GracefulReboot).into();
        assert_eq!(reboot.as_bytes(), &[0xB0, 0x04, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn acknowledgement() {
        assert_eq!(SetFruActivation::parse_success_response(&[0x00]), Ok(()));
        assert_eq!(
            FruControl::parse_success_response(&[0x01]),
            Err(PicmgError::InvalidIdentifier(0x01))
        );
    }

    #[test]
    fn control_options() {
        for raw in 0..=3 {
            assert_eq!(u8::from(FruControlOption::try_from(raw).unwrap()), raw);
        }
        assert!(FruControlOption::try_from(4).is_err());
    }
}
