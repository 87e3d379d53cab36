mod completion_code;
use std::{num::NonZeroU8, sync::Arc};

pub use completion_code::{CompletionCode, CompletionErrorCode, ResponseUnavailableReason};

mod impls;

#[cfg(feature = "ipmitool")]
pub use impls::ipmitool;

mod netfn;
pub use netfn::NetFn;

mod request;
pub use request::{pack_netfn_lun, unpack_netfn_lun, Request};

mod response;
pub use response::{Exchange, Response};

use crate::{error::SendError, session::Session, target::Target};

/// A slave address on an IPMB.
///
/// Addresses are kept in their 8-bit form, as they appear on the wire and
/// on the `ipmitool` command line (e.g. `0x20` for the BMC).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(pub u8);

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelNumber(NonZeroU8);

impl ChannelNumber {
    /// Create a new `ChannelNumber`.
    ///
    /// This function returns `None` if `value > 0xB`
    pub fn new(value: NonZeroU8) -> Option<Self> {
        if value.get() <= 0xB {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Get the value of this `ChannelNumber`.
    ///
    /// It is guaranteed that values returned by
    /// this function are less than or equal to `0xB`
    pub fn value(&self) -> NonZeroU8 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Primary,
    Numbered(ChannelNumber),
    System,
    Current,
}

impl Channel {
    /// Create a new `Channel`.
    ///
    /// This function returns `None` if `value == 0xC || value == 0xD || value > 0xF`
    pub fn new(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Primary),
            0xE => Some(Self::Current),
            0xF => Some(Self::System),
            v => Some(Self::Numbered(ChannelNumber::new(NonZeroU8::new(v)?)?)),
        }
    }

    /// The number of this channel.
    ///
    /// This value is guaranteed to be less than or
    /// equal to 0xF.
    pub fn value(&self) -> u8 {
        match self {
            Channel::Primary => 0x0,
            Channel::Numbered(v) => v.value().get(),
            Channel::Current => 0xE,
            Channel::System => 0xF,
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Primary => write!(f, "Primary channel"),
            Channel::Numbered(number) => write!(f, "Channel 0x{:01X}", number.value()),
            Channel::Current => write!(f, "Current channel"),
            Channel::System => write!(f, "System channel"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalUnit {
    Zero,
    One,
    Two,
    Three,
}

impl LogicalUnit {
    /// Construct a `LogicalUnit` from the two lowest bits of `value`,
    /// ignoring all other bits.
    pub fn from_low_bits(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Self::Zero,
            0b01 => Self::One,
            0b10 => Self::Two,
            _ => Self::Three,
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            LogicalUnit::Zero => 0,
            LogicalUnit::One => 1,
            LogicalUnit::Two => 2,
            LogicalUnit::Three => 3,
        }
    }
}

impl TryFrom<u8> for LogicalUnit {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 0b11 {
            Ok(Self::from_low_bits(value))
        } else {
            Err(())
        }
    }
}

impl From<LogicalUnit> for u8 {
    fn from(value: LogicalUnit) -> Self {
        value.value()
    }
}

/// Anything that can carry IPMI request bytes to a [`Target`] and bring
/// back a completion code and response data.
///
/// Session setup and teardown are optional capabilities: the default
/// implementations do nothing.
pub trait Transport {
    /// Set up a session. Returning `Ok` confirms that the session is
    /// established.
    fn establish_session(&mut self, session: &Session) -> Result<(), SendError> {
        let _ = session;
        Ok(())
    }

    fn close_session(&mut self, session: &Session) -> Result<(), SendError> {
        let _ = session;
        Ok(())
    }

    /// Send `request` to `target` and wait for its response.
    ///
    /// Implementations must fail with [`SendError::Timeout`] if the remote
    /// side never answered, and must not report that as a completion code.
    fn send_and_receive(&mut self, target: &Target, request: &Request)
        -> Result<Response, SendError>;
}

/// A transport shared between a [`Session`] and the dispatcher using it.
///
/// The lock serialises requests, so at most one is in flight per transport.
pub type SharedTransport = Arc<parking_lot::Mutex<dyn Transport + Send>>;

/// Wrap `transport` so that it can be bound to a [`Session`].
pub fn shared<T>(transport: T) -> SharedTransport
where
    T: Transport + Send + 'static,
{
    Arc::new(parking_lot::Mutex::new(transport))
}

/// A typed IPMI command: knows how to encode itself into a [`Request`]
/// and how to decode the data of a successful response.
pub trait IpmiCommand: Into<Request> {
    type Output;
    type Error;

    fn parse_success_response(data: &[u8]) -> Result<Self::Output, Self::Error>;

    /// Give the command a chance to interpret a non-zero completion code.
    ///
    /// Returning `None` reports the completion code as-is.
    fn handle_completion_code(
        completion_code: CompletionErrorCode,
        data: &[u8],
    ) -> Option<Self::Error> {
        let _ = (completion_code, data);
        None
    }
}

/// Returned by commands whose response was shorter than required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not enough data in response")]
pub struct NotEnoughData;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn channel_values() {
        assert_eq!(Channel::new(0), Some(Channel::Primary));
        assert_eq!(Channel::new(7).map(|c| c.value()), Some(7));
        assert_eq!(Channel::new(0xE), Some(Channel::Current));
        assert_eq!(Channel::new(0xF), Some(Channel::System));
        assert_eq!(Channel::new(0xC), None);
        assert_eq!(Channel::new(0xD), None);
        assert_eq!(Channel::new(0x10), None);
    }

    #[test]
    fn lun_low_bits() {
        assert_eq!(LogicalUnit::from_low_bits(0b1110), LogicalUnit::Two);
        assert_eq!(LogicalUnit::try_from(3), Ok(LogicalUnit::Three));
        assert_eq!(LogicalUnit::try_from(4), Err(()));
    }
}
