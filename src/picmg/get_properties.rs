use crate::{
    connection::{IpmiCommand, Request},
    fmt::LogItem,
    log_vec, Loggable,
};

use super::{request, strip_identifier, PicmgError};

/// The Get PICMG Properties command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPicmgProperties;

impl GetPicmgProperties {
    pub const CMD: u8 = 0x00;
}

impl From<GetPicmgProperties> for Request {
    fn from(_: GetPicmgProperties) -> Self {
        request(GetPicmgProperties::CMD, &[])
    }
}

impl IpmiCommand for GetPicmgProperties {
    type Output = PicmgProperties;

    type Error = PicmgError;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        PicmgProperties::from_data(strip_identifier(data)?).ok_or(PicmgError::NotEnoughData)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PicmgProperties {
    pub major_version: u8,
    pub minor_version: u8,
    /// The highest FRU device ID managed by the controller.
    pub max_fru_device_id: u8,
    /// The FRU device ID of the controller itself.
    pub ipmc_fru_device_id: u8,
}

impl PicmgProperties {
    /// Parse from response data following the PICMG identifier.
    pub fn from_data(data: &[u8]) -> Option<Self> {
        let &[version, max_fru_device_id, ipmc_fru_device_id, ..] = data else {
            return None;
        };

        Some(Self {
            major_version: version & 0xF,
            minor_version: (version >> 4) & 0xF,
            max_fru_device_id,
            ipmc_fru_device_id,
        })
    }
}

impl Loggable for PicmgProperties {
    fn as_log(&self) -> Vec<LogItem> {
        log_vec![
            (0, "PICMG properties"),
            (
                1,
                "Extension version",
                format!("{}.{}", self.major_version, self.minor_version)
            ),
            (1, "Max FRU device ID", self.max_fru_device_id),
            (1, "IPMC FRU device ID", self.ipmc_fru_device_id),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request() {
        let request: Request = GetPicmgProperties.into();
        assert_eq!(request.as_bytes(), &[0xB0, 0x00, 0x00]);
    }

    #[test]
    fn parse() {
        assert_eq!(
            GetPicmgProperties::parse_success_response(&[0x00, 0x32, 0x08, 0x00]),
            Ok(PicmgProperties {
                major_version: 2,
                minor_version: 3,
                max_fru_device_id: 8,
                ipmc_fru_device_id: 0,
            })
        );

        assert_eq!(
            GetPicmgProperties::parse_success_response(&[0x00, 0x32]),
            Err(PicmgError::NotEnoughData)
        );
    }
}
