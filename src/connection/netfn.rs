/// A network function: the 6-bit command-group selector carried in the
/// high bits of the first request byte.
///
/// Requests use even values, and the matching response uses the next
/// (odd) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetFn {
    Chassis,
    Bridge,
    SensorEvent,
    App,
    Firmware,
    Storage,
    Transport,
    /// Group extension, identified by the first data byte (e.g. `0x00` for PICMG).
    Group,
    OemGroup,
    Unknown(u8),
}

impl NetFn {
    /// The largest value that fits in the 6 bits available for a netfn.
    pub const MAX: u8 = 0x3F;

    /// The (even) value used when sending a request with this netfn.
    pub fn request_value(&self) -> u8 {
        match self {
            NetFn::Chassis => 0x00,
            NetFn::Bridge => 0x02,
            NetFn::SensorEvent => 0x04,
            NetFn::App => 0x06,
            NetFn::Firmware => 0x08,
            NetFn::Storage => 0x0A,
            NetFn::Transport => 0x0C,
            NetFn::Group => 0x2C,
            NetFn::OemGroup => 0x2E,
            NetFn::Unknown(v) => *v & 0x3E,
        }
    }

    /// The (odd) value a response to a request with this netfn carries.
    pub fn response_value(&self) -> u8 {
        self.request_value() | 1
    }
}

impl From<u8> for NetFn {
    fn from(value: u8) -> Self {
        match value & 0x3E {
            0x00 => Self::Chassis,
            0x02 => Self::Bridge,
            0x04 => Self::SensorEvent,
            0x06 => Self::App,
            0x08 => Self::Firmware,
            0x0A => Self::Storage,
            0x0C => Self::Transport,
            0x2C => Self::Group,
            0x2E => Self::OemGroup,
            v => Self::Unknown(v),
        }
    }
}

#[test]
fn request_and_response_values() {
    assert_eq!(NetFn::from(0x06), NetFn::App);
    assert_eq!(NetFn::from(0x07), NetFn::App);
    assert_eq!(NetFn::App.response_value(), 0x07);
    assert_eq!(NetFn::from(0x2C), NetFn::Group);
    assert_eq!(NetFn::from(0x30), NetFn::Unknown(0x30));
    assert_eq!(NetFn::Unknown(0x31).request_value(), 0x30);
}
