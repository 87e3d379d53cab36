use std::io;

use thiserror::Error;

use crate::connection::{CompletionErrorCode, NetFn};

/// A required precondition was never set, or an addressing constraint
/// was violated.
///
/// These are always fixable by the caller and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no transport bound")]
    NoTransport,
    #[error("no IPMI session has been set")]
    NoSession,
    #[error("no IPMI target has been set")]
    NoTarget,
    #[error("session has not been established with the transport")]
    SessionNotEstablished,
    #[error("no transport endpoint has been set")]
    NoEndpoint,
    #[error("routing has {0} hops, at most double bridging is supported")]
    RoutingTooDeep(usize),
    #[error("0x{0:02X} is not a valid bridge channel")]
    InvalidChannel(u8),
    #[error("could not parse route `{0}`, expected `<address>:<channel>`")]
    InvalidRoute(String),
    #[error("invalid connection URI `{0}`")]
    InvalidUri(String),
    #[error("password authentication requires a username and password")]
    MissingCredentials,
    #[error("auth type {0:?} is not supported by this transport")]
    UnsupportedAuthType(crate::session::AuthType),
    #[error("operation `{name}` is provided by both `{first}` and `{second}`")]
    DuplicateOperation {
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

/// The transport mechanism itself failed, independent of IPMI semantics.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to run transport: {0}")]
    Io(#[from] io::Error),
    #[error("transport failed with status {status:?}: {output}")]
    Failed { status: Option<i32>, output: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// The ways a single request/response exchange can fail.
///
/// A non-zero completion code is *not* one of them: the device answered,
/// and the answer is returned as a normal [`Response`](crate::connection::Response).
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("timeout waiting for response")]
    Timeout,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error returned by command operations.
///
/// `P` is the command-specific decode error.
#[derive(Debug)]
pub enum IpmiError<P> {
    Configuration(ConfigurationError),
    Timeout,
    Transport(TransportError),
    UnknownOperation(String),
    InvalidArguments {
        operation: &'static str,
        reason: String,
    },
    Failed {
        netfn: NetFn,
        cmd: u8,
        completion_code: CompletionErrorCode,
        data: Option<Vec<u8>>,
    },
    Command {
        error: P,
        netfn: NetFn,
        cmd: u8,
        completion_code: Option<CompletionErrorCode>,
        data: Vec<u8>,
    },
}

impl<P> From<SendError> for IpmiError<P> {
    fn from(value: SendError) -> Self {
        match value {
            SendError::Configuration(e) => Self::Configuration(e),
            SendError::Timeout => Self::Timeout,
            SendError::Transport(e) => Self::Transport(e),
        }
    }
}

impl<P> From<ConfigurationError> for IpmiError<P> {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

impl<P> IpmiError<P> {
    pub fn map_command<P2, F>(self, f: F) -> IpmiError<P2>
    where
        F: FnOnce(P) -> P2,
    {
        match self {
            IpmiError::Configuration(e) => IpmiError::Configuration(e),
            IpmiError::Timeout => IpmiError::Timeout,
            IpmiError::Transport(e) => IpmiError::Transport(e),
            IpmiError::UnknownOperation(name) => IpmiError::UnknownOperation(name),
            IpmiError::InvalidArguments { operation, reason } => {
                IpmiError::InvalidArguments { operation, reason }
            }
            IpmiError::Failed {
                netfn,
                cmd,
                completion_code,
                data,
            } => IpmiError::Failed {
                netfn,
                cmd,
                completion_code,
                data,
            },
            IpmiError::Command {
                error,
                netfn,
                cmd,
                completion_code,
                data,
            } => IpmiError::Command {
                error: f(error),
                netfn,
                cmd,
                completion_code,
                data,
            },
        }
    }

    /// Erase the command error type, so that results of different
    /// commands can flow through the same dispatch path.
    pub fn boxed(self) -> IpmiError<BoxError>
    where
        P: std::error::Error + Send + Sync + 'static,
    {
        self.map_command(|e| Box::new(e) as BoxError)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl<P> core::fmt::Display for IpmiError<P>
where
    P: core::fmt::Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IpmiError::Configuration(e) => write!(f, "configuration error: {e}"),
            IpmiError::Timeout => write!(f, "timeout waiting for response"),
            IpmiError::Transport(e) => write!(f, "transport error: {e}"),
            IpmiError::UnknownOperation(name) => write!(f, "unknown operation `{name}`"),
            IpmiError::InvalidArguments { operation, reason } => {
                write!(f, "invalid arguments for `{operation}`: {reason}")
            }
            IpmiError::Failed {
                netfn,
                cmd,
                completion_code,
                ..
            } => write!(
                f,
                "command 0x{cmd:02X} ({netfn:?}) failed: {completion_code:?}"
            ),
            IpmiError::Command {
                error, netfn, cmd, ..
            } => write!(f, "command 0x{cmd:02X} ({netfn:?}): {error}"),
        }
    }
}

impl<P> std::error::Error for IpmiError<P>
where
    P: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IpmiError::Configuration(e) => Some(e),
            IpmiError::Transport(e) => Some(e),
            IpmiError::Command { error, .. } => Some(error),
            _ => None,
        }
    }
}
