use crate::connection::{LogicalUnit, NetFn};

/// Pack a netfn and LUN into the first byte of a request.
///
/// The netfn occupies the high 6 bits, the LUN the low 2 bits.
pub const fn pack_netfn_lun(netfn: u8, lun: u8) -> u8 {
    ((netfn & NetFn::MAX) << 2) | (lun & 0b11)
}

/// Split the first byte of a request into its netfn and LUN.
pub const fn unpack_netfn_lun(value: u8) -> (u8, u8) {
    (value >> 2, value & 0b11)
}

/// An IPMI request, kept as the exact bytes that go on the wire:
/// `[netfn << 2 | lun, cmd, data...]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    bytes: Vec<u8>,
}

impl Request {
    /// Create a new IPMI request message.
    pub fn new(netfn: NetFn, lun: LogicalUnit, cmd: u8, data: Vec<u8>) -> Self {
        let mut bytes = Vec::with_capacity(data.len() + 2);
        bytes.push(pack_netfn_lun(netfn.request_value(), lun.value()));
        bytes.push(cmd);
        bytes.extend(data);
        Self { bytes }
    }

    /// Create a new IPMI request message from a raw netfn value.
    ///
    /// Returns `None` if `netfn` does not fit in 6 bits.
    pub fn new_raw(netfn: u8, lun: LogicalUnit, cmd: u8, data: &[u8]) -> Option<Self> {
        if netfn > NetFn::MAX {
            return None;
        }

        let mut bytes = Vec::with_capacity(data.len() + 2);
        bytes.push(pack_netfn_lun(netfn, lun.value()));
        bytes.push(cmd);
        bytes.extend_from_slice(data);
        Some(Self { bytes })
    }

    /// Wrap already-encoded request bytes.
    ///
    /// Returns `None` if `bytes` does not at least contain the
    /// netfn/LUN byte and a command byte.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        if bytes.len() < 2 {
            None
        } else {
            Some(Self { bytes })
        }
    }

    /// Get the netfn for the request.
    pub fn netfn(&self) -> NetFn {
        self.netfn_raw().into()
    }

    /// Get the raw (6-bit) value of the netfn for the request.
    pub fn netfn_raw(&self) -> u8 {
        unpack_netfn_lun(self.bytes[0]).0
    }

    pub fn lun(&self) -> LogicalUnit {
        LogicalUnit::from_low_bits(self.bytes[0])
    }

    /// Get the command value for the request.
    pub fn cmd(&self) -> u8 {
        self.bytes[1]
    }

    /// Get a shared reference to the data of the request (does not include netfn or command).
    pub fn data(&self) -> &[u8] {
        &self.bytes[2..]
    }

    /// The full request, as transmitted.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl core::fmt::Display for Request {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[")?;
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn packing_known_values() {
        assert_eq!(pack_netfn_lun(0x06, 0), 0x18);
        assert_eq!(pack_netfn_lun(0x06, 2), 0x1a);
        assert_eq!(unpack_netfn_lun(0x1a), (0x06, 2));
    }

    #[test]
    fn packing_recovers_every_pair() {
        for netfn in 0..=NetFn::MAX {
            for lun in 0..=3 {
                assert_eq!(unpack_netfn_lun(pack_netfn_lun(netfn, lun)), (netfn, lun));
            }
        }
    }

    #[test]
    fn data_is_kept_in_order() {
        let request = Request::new(NetFn::Group, LogicalUnit::Zero, 0x0C, vec![0x00, 0x03, 0x01]);

        assert_eq!(request.as_bytes(), &[0xB0, 0x0C, 0x00, 0x03, 0x01]);
        assert_eq!(request.netfn(), NetFn::Group);
        assert_eq!(request.cmd(), 0x0C);
        assert_eq!(request.data(), &[0x00, 0x03, 0x01]);
        assert_eq!(request.to_string(), "[b0 0c 00 03 01]");
    }

    #[test]
    fn raw_requests() {
        assert!(Request::new_raw(0x40, LogicalUnit::Zero, 0x01, &[]).is_none());
        assert!(Request::from_bytes(vec![0x18]).is_none());

        let request = Request::new_raw(0x06, LogicalUnit::Two, 0x01, &[]).unwrap();
        assert_eq!(request.as_bytes(), &[0x1a, 0x01]);
        assert_eq!(request.lun(), LogicalUnit::Two);
        assert_eq!(Request::from_bytes(vec![0x1a, 0x01]), Some(request));
    }
}
