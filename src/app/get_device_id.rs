use crate::{
    connection::{IpmiCommand, LogicalUnit, NetFn, NotEnoughData, Request},
    fmt::LogItem,
    log_vec, Loggable,
};

/// The Get Device ID command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetDeviceId;

impl GetDeviceId {
    pub const CMD: u8 = 0x01;
}

impl From<GetDeviceId> for Request {
    fn from(_: GetDeviceId) -> Self {
        Request::new(NetFn::App, LogicalUnit::Zero, GetDeviceId::CMD, Vec::new())
    }
}

impl IpmiCommand for GetDeviceId {
    type Output = DeviceId;

    type Error = NotEnoughData;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error> {
        DeviceId::from_data(data).ok_or(NotEnoughData)
    }
}

/// All of the fields that are returned when retrieving a
/// device's ID.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceId {
    /// The raw ID of the device.
    pub device_id: u8,
    /// The revision of the device.
    pub device_revision: u8,
    /// `true` if the device provides device SDRs.
    pub provides_device_sdrs: bool,
    /// `true` if the device is available, `false` if the device
    /// is in device firmware, SDR repository update, or self-initialization state.
    pub device_available: bool,
    /// The major version of the firmware revision of the device.
    pub major_fw_revision: u8,
    /// The minor version of the firmware revision of the device, decoded from BCD.
    pub minor_fw_revision: u8,
    /// The major version of the IPMI version supported by the device.
    pub major_version: u8,
    /// The minor version of the IPMI version supported by the device.
    pub minor_version: u8,
    /// `true` if the device is a chassis device per the ICMB specification.
    pub chassis_support: bool,
    /// `true` if the device will respond to bridge NetFN commands.
    pub bridge_support: bool,
    /// Whether the device generates event messages onto the IPMB.
    pub ipmb_event_generator_support: bool,
    /// Whether the device accepts event messages from the IPMB.
    pub ipmb_event_receiver_support: bool,
    /// Whether the device supports FRU inventory.
    pub fru_inventory_support: bool,
    /// Whether the device supports the SEL.
    pub sel_device_support: bool,
    /// Whether the device is an SDR repository device.
    pub sdr_repository_support: bool,
    /// Whether the device is a sensor device.
    pub sensor_device_support: bool,
    /// The IANA ID of the manufacturer.
    pub manufacturer_id: u32,
    /// The ID of the product.
    pub product_id: u16,
    /// Optional auxiliary firmware revision information.
    pub aux_revision: Option<[u8; 4]>,
}

impl DeviceId {
    /// Parse a `DeviceId` from IPMI response data.
    pub fn from_data(data: &[u8]) -> Option<Self> {
        if data.len() < 11 {
            return None;
        }

        let aux_revision = if data.len() < 15 {
            None
        } else {
            Some([data[11], data[12], data[13], data[14]])
        };

        // BCD encoded
        let fw_min = (data[3] & 0xF) + ((data[3] >> 4) & 0xF) * 10;

        let me = Self {
            device_id: data[0],
            device_revision: data[1] & 0xF,
            provides_device_sdrs: (data[1] & 0x80) == 0x80,
            device_available: (data[2] & 0x80) != 0x80,
            major_fw_revision: (data[2] & 0x7F),
            minor_fw_revision: fw_min,
            major_version: data[4] & 0xF,
            minor_version: (data[4] >> 4) & 0xF,
            chassis_support: (data[5] & 0x80) == 0x80,
            bridge_support: (data[5] & 0x40) == 0x40,
            ipmb_event_generator_support: (data[5] & 0x20) == 0x20,
            ipmb_event_receiver_support: (data[5] & 0x10) == 0x10,
            fru_inventory_support: (data[5] & 0x08) == 0x08,
            sel_device_support: (data[5] & 0x04) == 0x04,
            sdr_repository_support: (data[5] & 0x02) == 0x02,
            sensor_device_support: (data[5] & 0x01) == 0x01,
            manufacturer_id: u32::from_le_bytes([data[6], data[7], data[8], 0]),
            product_id: u16::from_le_bytes([data[9], data[10]]),
            aux_revision,
        };

        Some(me)
    }
}

impl Loggable for DeviceId {
    fn as_log(&self) -> Vec<LogItem> {
        let (dev_id, dev_rev) = (self.device_id, self.device_revision);
        let (fw_maj, fw_min) = (self.major_fw_revision, self.minor_fw_revision);
        let (v_maj, v_min) = (self.major_version, self.minor_version);

        let mut log = log_vec![
            (0, "Device ID information"),
            (1, "Device ID", format!("0x{dev_id:02X}")),
            (1, "Device revision", format!("0x{dev_rev:02X}")),
            (1, "Manufacturer ID", format!("0x{:06X}", self.manufacturer_id)),
            (1, "Product ID", format!("0x{:04X}", self.product_id)),
            (1, "IPMI Version", format!("{v_maj}.{v_min}")),
            (1, "FW revision", format!("{fw_maj}.{fw_min:02}")),
            (1, "Device available", self.device_available),
            (1, "Provides device SDRs", self.provides_device_sdrs),
            (1, "Chassis support", self.chassis_support),
            (1, "Bridge support", self.bridge_support),
            (1, "IPMB Event gen sup", self.ipmb_event_generator_support),
            (1, "IPMB Event recv sup", self.ipmb_event_receiver_support),
            (1, "FRU Inventory sup", self.fru_inventory_support),
            (1, "SEL Device support", self.sel_device_support),
            (1, "SDR Repository sup", self.sdr_repository_support),
            (1, "Sensor Device sup", self.sensor_device_support)
        ];

        if let Some(aux_rev) = &self.aux_revision {
            let element = (1, "Auxiliary revision", format!("{aux_rev:02X?}")).into();
            log.insert(7, element);
        }

        log
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse() {
        let data = hex::decode("2081011231ff5a3100020000341201").unwrap();

        let device_id = DeviceId::from_data(&data).unwrap();

        assert_eq!(device_id.device_id, 0x20);
        assert_eq!(device_id.device_revision, 1);
        assert!(device_id.provides_device_sdrs);
        assert!(device_id.device_available);
        assert_eq!((device_id.major_fw_revision, device_id.minor_fw_revision), (1, 12));
        assert_eq!((device_id.major_version, device_id.minor_version), (1, 3));
        assert!(device_id.bridge_support);
        assert_eq!(device_id.manufacturer_id, 0x00315A);
        assert_eq!(device_id.product_id, 0x0002);
        assert_eq!(device_id.aux_revision, Some([0x00, 0x34, 0x12, 0x01]));
    }

    #[test]
    fn too_short() {
        assert_eq!(GetDeviceId::parse_success_response(&[0x20; 10]), Err(NotEnoughData));
    }

    #[test]
    fn request() {
        let request: Request = GetDeviceId.into();
        assert_eq!(request.as_bytes(), &[0x18, 0x01]);
    }
}
