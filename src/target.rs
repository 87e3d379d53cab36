//! Addressing of IPMI targets, including targets that are only reachable
//! through one or two bridging controllers.

use crate::{
    connection::{Address, Channel},
    error::ConfigurationError,
};

/// One step on the way to a target: send through `bridge_channel` to the
/// controller at `address`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hop {
    address: Address,
    bridge_channel: Channel,
}

impl Hop {
    pub fn new(address: u8, bridge_channel: u8) -> Result<Self, ConfigurationError> {
        let bridge_channel =
            Channel::new(bridge_channel).ok_or(ConfigurationError::InvalidChannel(bridge_channel))?;

        Ok(Self {
            address: Address(address),
            bridge_channel,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn bridge_channel(&self) -> Channel {
        self.bridge_channel
    }
}

/// How a request has to be delivered to reach a target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bridging {
    /// The target is directly addressable.
    Direct,
    /// Single-level bridging through `channel`.
    Single { channel: Channel },
    /// Bridge through `transit_channel` to the controller at
    /// `transit_address`, then through `channel` to the target.
    Double {
        transit_channel: Channel,
        transit_address: Address,
        channel: Channel,
    },
}

impl Bridging {
    /// The largest number of hops that can be resolved.
    pub const MAX_HOPS: usize = 2;

    pub fn resolve(routing: &[Hop]) -> Result<Self, ConfigurationError> {
        match routing {
            [] => Ok(Self::Direct),
            [first] => Ok(Self::Single {
                channel: first.bridge_channel,
            }),
            [first, second] => Ok(Self::Double {
                transit_channel: first.bridge_channel,
                transit_address: second.address,
                channel: second.bridge_channel,
            }),
            hops => Err(ConfigurationError::RoutingTooDeep(hops.len())),
        }
    }
}

/// A logical IPMI destination: a controller address and the route to it.
///
/// A `Target` only records addressing; transports resolve it with
/// [`Target::bridging`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    address: Address,
    routing: Vec<Hop>,
}

impl Target {
    pub fn new(target_address: u8) -> Self {
        Self {
            address: Address(target_address),
            routing: Vec::new(),
        }
    }

    pub fn with_routing(target_address: u8, hops: &[(u8, u8)]) -> Result<Self, ConfigurationError> {
        let mut target = Self::new(target_address);
        target.set_routing(hops)?;
        Ok(target)
    }

    /// Set the path over which the target is reachable, as
    /// `(address, bridge_channel)` pairs.
    ///
    /// At most two hops are accepted. On error, the previous routing is
    /// left untouched.
    pub fn set_routing(&mut self, hops: &[(u8, u8)]) -> Result<(), ConfigurationError> {
        if hops.len() > Bridging::MAX_HOPS {
            return Err(ConfigurationError::RoutingTooDeep(hops.len()));
        }

        let routing = hops
            .iter()
            .map(|&(address, channel)| Hop::new(address, channel))
            .collect::<Result<Vec<_>, _>>()?;

        log::trace!("Routing to {} set to {:?}", self.address, routing);

        self.routing = routing;
        Ok(())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn routing(&self) -> &[Hop] {
        &self.routing
    }

    pub fn bridging(&self) -> Result<Bridging, ConfigurationError> {
        Bridging::resolve(&self.routing)
    }

    /// Parse a `<address>:<channel>` route descriptor, e.g. `0x20:7`.
    pub fn parse_route(value: &str) -> Result<(u8, u8), ConfigurationError> {
        let err = || ConfigurationError::InvalidRoute(value.to_string());

        let (address, channel) = value.split_once(':').ok_or_else(err)?;
        let address = parse_u8(address).ok_or_else(err)?;
        let channel = parse_u8(channel).ok_or_else(err)?;

        Ok((address, channel))
    }
}

/// Parse a `0x`-prefixed hex or a decimal byte.
pub fn parse_u8(value: &str) -> Option<u8> {
    let value = value.trim();

    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn channel(value: u8) -> Channel {
        Channel::new(value).unwrap()
    }

    #[test]
    fn direct() {
        let target = Target::new(0x72);
        assert_eq!(target.bridging(), Ok(Bridging::Direct));
    }

    #[test]
    fn single_bridge() {
        let target = Target::with_routing(0x72, &[(0x20, 7)]).unwrap();

        assert_eq!(
            target.bridging(),
            Ok(Bridging::Single {
                channel: channel(7)
            })
        );
    }

    #[test]
    fn double_bridge() {
        let target = Target::with_routing(0x72, &[(0x20, 7), (0x82, 0)]).unwrap();

        assert_eq!(
            target.bridging(),
            Ok(Bridging::Double {
                transit_channel: channel(7),
                transit_address: Address(0x82),
                channel: Channel::Primary,
            })
        );
    }

    #[test]
    fn too_many_hops() {
        let mut target = Target::with_routing(0x72, &[(0x20, 7)]).unwrap();

        let result = target.set_routing(&[(0x20, 7), (0x82, 0), (0x84, 1)]);

        assert_eq!(result, Err(ConfigurationError::RoutingTooDeep(3)));
        assert_eq!(target.routing().len(), 1);
    }

    #[test]
    fn resolve_rejects_deep_routing() {
        let hop = Hop::new(0x20, 1).unwrap();
        assert_eq!(
            Bridging::resolve(&[hop, hop, hop]),
            Err(ConfigurationError::RoutingTooDeep(3))
        );
    }

    #[test]
    fn invalid_channel() {
        assert_eq!(
            Target::with_routing(0x72, &[(0x20, 0xC)]),
            Err(ConfigurationError::InvalidChannel(0xC))
        );
    }

    #[test]
    fn routes() {
        assert_eq!(Target::parse_route("0x20:7"), Ok((0x20, 7)));
        assert_eq!(Target::parse_route("130:0x0"), Ok((0x82, 0)));
        assert!(Target::parse_route("0x20").is_err());
        assert!(Target::parse_route("0x200:1").is_err());
    }
}
