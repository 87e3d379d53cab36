use std::io::ErrorKind;

use clap::Parser;
use ipmi_dispatch::{
    connection::ipmitool::Ipmitool, create_connection, session::ConnectionUri, target::Target,
    Ipmi,
};

#[allow(unused)]
fn main() {}

#[derive(Parser)]
pub struct CommonOpts {
    /// The connection URI to use
    #[clap(default_value = "ipmitool://localhost", long, short)]
    connection_uri: String,
    /// The IPMB address of the target controller
    #[clap(default_value = "0x20", long, short)]
    target: String,
    /// A hop of the route to the target, as `address:channel`. Up to two
    /// hops may be given.
    #[clap(long, short)]
    route: Vec<String>,
    /// The `ipmitool` binary to run
    #[clap(default_value = "ipmitool", long)]
    ipmitool_path: String,
}

pub fn error<T>(val: T) -> std::io::Error
where
    T: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    std::io::Error::new(ErrorKind::Other, val)
}

impl CommonOpts {
    fn target(&self) -> std::io::Result<Target> {
        let address = ipmi_dispatch::target::parse_u8(&self.target)
            .ok_or_else(|| error(format!("Invalid target address '{}'", self.target)))?;

        let hops = self
            .route
            .iter()
            .map(|hop| Target::parse_route(hop))
            .collect::<Result<Vec<_>, _>>()
            .map_err(error)?;

        Target::with_routing(address, &hops).map_err(error)
    }

    pub fn get_connection(&self) -> std::io::Result<Ipmi> {
        let uri: ConnectionUri = self.connection_uri.parse().map_err(error)?;

        log::debug!("Opening connection to {}", uri.host());

        let transport = Ipmitool::new().with_path(&self.ipmitool_path);
        let mut ipmi = create_connection(transport).map_err(error)?;

        let session = ipmi.session_mut().map_err(error)?;
        session.configure(&uri);
        session
            .establish()
            .map_err(|e| error(format!("Session setup failed: {e}")))?;

        ipmi.set_target(self.target()?);

        Ok(ipmi)
    }
}
