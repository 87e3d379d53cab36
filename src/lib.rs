//! IPMI-dispatch: addressing, sessions and command dispatch for IPMI clients.
//!
//! This library resolves single- and double-bridged [`target`]s, carries
//! [`session`] parameters, and binds command catalogs (in the [`app`] and
//! [`picmg`] modules) to any [`Transport`](connection::Transport) through a
//! single send primitive (see [`dispatch`]).
//!
//! ```no_run
//! use ipmi_dispatch::{connection::ipmitool::Ipmitool, create_connection, target::Target};
//!
//! let mut ipmi = create_connection(Ipmitool::new()).unwrap();
//!
//! let session = ipmi.session_mut().unwrap();
//! session.set_transport_endpoint("shelf-manager");
//! session.establish().unwrap();
//!
//! ipmi.set_target(Target::with_routing(0x72, &[(0x20, 7)]).unwrap());
//!
//! let device_id = ipmi.invoke("get_device_id", &[]).unwrap();
//! ipmi_dispatch::Logger::log(&log::Level::Info.into(), &*device_id);
//! ```

pub mod app;

pub mod connection;

pub mod dispatch;

mod error;
pub use error::{BoxError, ConfigurationError, IpmiError, SendError, TransportError};

pub mod picmg;

pub mod session;

pub mod target;

#[macro_use]
mod fmt;
pub use fmt::{LogItem, LogOutput, Loggable, Logger};

use connection::{IpmiCommand, Request, Response, SharedTransport, Transport};
use dispatch::{CommandGroup, OperationResult, Registry, Sender};
use session::Session;
use target::Target;

/// Binds a [`Session`] and a default [`Target`] to a catalog of command
/// groups.
///
/// Operations are looked up by name in the [`Registry`] and run with a
/// [`Sender`] bound to the current session and target. Errors of the
/// operations are passed through unchanged.
pub struct Ipmi {
    session: Option<Session>,
    target: Option<Target>,
    registry: Registry,
}

impl Default for Ipmi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ipmi {
    /// Create a dispatcher without any command groups.
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            session: None,
            target: None,
            registry,
        }
    }

    /// Create a dispatcher with the bundled command groups.
    pub fn with_default_groups() -> Result<Self, ConfigurationError> {
        let mut registry = Registry::new();
        registry.register(app::App)?;
        registry.register(picmg::Picmg)?;
        Ok(Self::with_registry(registry))
    }

    /// Add a command group. Fails if one of its operation names is already
    /// provided by a registered group.
    pub fn register<G>(&mut self, group: G) -> Result<(), ConfigurationError>
    where
        G: CommandGroup + Send + Sync + 'static,
    {
        self.registry.register(group)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn session(&self) -> Result<&Session, ConfigurationError> {
        self.session.as_ref().ok_or(ConfigurationError::NoSession)
    }

    pub fn session_mut(&mut self) -> Result<&mut Session, ConfigurationError> {
        self.session.as_mut().ok_or(ConfigurationError::NoSession)
    }

    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = Some(target);
    }

    pub fn target(&self) -> Result<&Target, ConfigurationError> {
        self.target.as_ref().ok_or(ConfigurationError::NoTarget)
    }

    /// The send primitive bound to the current session and target.
    pub fn sender(&self) -> Result<Sender<'_>, ConfigurationError> {
        Sender::new(self.session()?, self.target()?)
    }

    /// Run the operation registered under `name`.
    pub fn invoke(&self, name: &str, args: &[u8]) -> OperationResult {
        let (group, operation) = self
            .registry
            .resolve(name)
            .ok_or_else(|| IpmiError::UnknownOperation(name.to_string()))?;

        let mut sender = self.sender()?;

        log::debug!("Invoking {}::{} with {:02X?}", group.name(), name, args);

        operation.invoke(&mut sender, args)
    }

    /// Send a raw request to the current target.
    pub fn send(&self, request: Request) -> Result<Response, SendError> {
        self.sender()?.send(request)
    }

    /// Send a typed command to the current target.
    pub fn send_recv<CMD>(&self, command: CMD) -> Result<CMD::Output, IpmiError<CMD::Error>>
    where
        CMD: IpmiCommand,
    {
        self.sender()?.send_recv(command)
    }
}

/// Create a dispatcher with the bundled command groups and a session that
/// is carried over `transport`.
///
/// No target is set: callers pick one with [`Ipmi::set_target`].
pub fn create_connection<T>(transport: T) -> Result<Ipmi, ConfigurationError>
where
    T: Transport + Send + 'static,
{
    create_shared_connection(connection::shared(transport))
}

/// Like [`create_connection`], for a transport that is shared with other
/// sessions.
pub fn create_shared_connection(transport: SharedTransport) -> Result<Ipmi, ConfigurationError> {
    let mut ipmi = Ipmi::with_default_groups()?;
    ipmi.set_session(Session::with_transport(transport));
    Ok(ipmi)
}
