//! Binding of command groups to a session and target.
//!
//! Command groups never see the transport, the session, or the target:
//! each operation receives a [`Sender`] that already closes over them.

use std::{any::Any, collections::HashMap};

use crate::{
    connection::{CompletionErrorCode, IpmiCommand, Request, Response},
    error::{BoxError, ConfigurationError, IpmiError, SendError},
    fmt::Loggable,
    session::Session,
    target::Target,
};

/// The send primitive handed to command operations.
pub struct Sender<'a> {
    session: &'a Session,
    target: &'a Target,
}

impl<'a> Sender<'a> {
    /// Bind `session` and `target`. Fails if the session has no transport.
    pub fn new(session: &'a Session, target: &'a Target) -> Result<Self, ConfigurationError> {
        session.transport()?;
        Ok(Self { session, target })
    }

    pub fn target(&self) -> &Target {
        self.target
    }

    /// Send `request` and wait for its response.
    ///
    /// A non-zero completion code is returned as part of the [`Response`].
    pub fn send(&mut self, request: Request) -> Result<Response, SendError> {
        let transport = self.session.transport()?;

        log::debug!("IPMI request to {}: {}", self.target.address(), request);

        let result = transport.lock().send_and_receive(self.target, &request);

        match &result {
            Ok(response) => log::debug!(
                "IPMI response (cc 0x{:02X}, data {:02X?})",
                response.cc(),
                response.data().unwrap_or_default()
            ),
            Err(SendError::Timeout) => {
                log::warn!("IPMI request to {} timed out", self.target.address())
            }
            Err(e) => log::debug!("IPMI request failed: {e}"),
        }

        result
    }

    /// Send a typed command and decode its response.
    pub fn send_recv<CMD>(&mut self, command: CMD) -> Result<CMD::Output, IpmiError<CMD::Error>>
    where
        CMD: IpmiCommand,
    {
        let request: Request = command.into();
        let (netfn, cmd) = (request.netfn(), request.cmd());

        let (cc, data) = self.send(request)?.into_parts();

        if let Ok(completion_code) = CompletionErrorCode::try_from(cc) {
            let raw = data.as_deref().unwrap_or_default();

            let error = match CMD::handle_completion_code(completion_code, raw) {
                Some(error) => IpmiError::Command {
                    error,
                    netfn,
                    cmd,
                    completion_code: Some(completion_code),
                    data: raw.to_vec(),
                },
                None => IpmiError::Failed {
                    netfn,
                    cmd,
                    completion_code,
                    data,
                },
            };

            return Err(error);
        }

        let data = data.unwrap_or_default();

        match CMD::parse_success_response(&data) {
            Ok(output) => Ok(output),
            Err(error) => Err(IpmiError::Command {
                error,
                netfn,
                cmd,
                completion_code: None,
                data,
            }),
        }
    }

    /// Send a typed command and erase its output and error types, for use
    /// in [`Operation`] handlers.
    pub fn run<CMD>(&mut self, command: CMD) -> OperationResult
    where
        CMD: IpmiCommand,
        CMD::Output: CommandOutput,
        CMD::Error: std::error::Error + Send + Sync + 'static,
    {
        self.send_recv(command)
            .map(|output| Box::new(output) as Box<dyn CommandOutput>)
            .map_err(IpmiError::boxed)
    }
}

/// The result of a command operation, usable without knowing which
/// command produced it.
pub trait CommandOutput: Loggable + core::fmt::Debug + Send + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T> CommandOutput for T
where
    T: Loggable + core::fmt::Debug + Send + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn CommandOutput {
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

pub type OperationResult = Result<Box<dyn CommandOutput>, IpmiError<BoxError>>;

pub type Handler = fn(&mut Sender<'_>, &[u8]) -> OperationResult;

/// A named command operation.
#[derive(Clone, Copy)]
pub struct Operation {
    name: &'static str,
    handler: Handler,
}

impl core::fmt::Debug for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Operation").field(&self.name).finish()
    }
}

impl Operation {
    pub const fn new(name: &'static str, handler: Handler) -> Self {
        Self { name, handler }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(&self, sender: &mut Sender<'_>, args: &[u8]) -> OperationResult {
        (self.handler)(sender, args)
    }
}

/// Check that an operation received exactly `N` argument bytes.
pub fn expect_args<const N: usize>(
    operation: &'static str,
    args: &[u8],
) -> Result<[u8; N], IpmiError<BoxError>> {
    args.try_into().map_err(|_| IpmiError::InvalidArguments {
        operation,
        reason: format!("expected {N} argument(s), got {}", args.len()),
    })
}

/// A catalog of command operations.
pub trait CommandGroup {
    fn name(&self) -> &'static str;

    fn operations(&self) -> &[Operation];
}

/// Maps operation names to the group and operation providing them.
///
/// Names are unique: registering a group that provides a name that is
/// already taken fails, and leaves the registry unchanged.
#[derive(Default)]
pub struct Registry {
    groups: Vec<Box<dyn CommandGroup + Send + Sync>>,
    operations: HashMap<&'static str, (usize, Operation)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<G>(&mut self, group: G) -> Result<(), ConfigurationError>
    where
        G: CommandGroup + Send + Sync + 'static,
    {
        let index = self.groups.len();
        let mut added: HashMap<&'static str, (usize, Operation)> = HashMap::new();

        for operation in group.operations() {
            let name = operation.name();

            let existing = self
                .operations
                .get(name)
                .map(|(idx, _)| self.groups[*idx].name())
                .or_else(|| added.get(name).map(|_| group.name()));

            if let Some(first) = existing {
                return Err(ConfigurationError::DuplicateOperation {
                    name,
                    first,
                    second: group.name(),
                });
            }

            added.insert(name, (index, *operation));
        }

        log::trace!(
            "Registered command group `{}` with {} operations",
            group.name(),
            added.len()
        );

        self.operations.extend(added);
        self.groups.push(Box::new(group));
        Ok(())
    }

    /// Find the group and operation registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<(&dyn CommandGroup, Operation)> {
        self.operations
            .get(name)
            .map(|(idx, operation)| (self.groups[*idx].as_ref() as &dyn CommandGroup, *operation))
    }

    /// All operation names, in registration order.
    pub fn operation_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.operations().iter().map(Operation::name))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().map(|group| group.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fmt::LogItem;

    #[derive(Debug)]
    struct Nothing;

    impl Loggable for Nothing {
        fn as_log(&self) -> Vec<LogItem> {
            Vec::new()
        }
    }

    fn nothing(_: &mut Sender<'_>, _: &[u8]) -> OperationResult {
        Ok(Box::new(Nothing))
    }

    struct Group(&'static str, &'static [Operation]);

    impl CommandGroup for Group {
        fn name(&self) -> &'static str {
            self.0
        }

        fn operations(&self) -> &[Operation] {
            self.1
        }
    }

    const FIRST: &[Operation] = &[
        Operation::new("reset", nothing),
        Operation::new("power_on", nothing),
    ];
    const SECOND: &[Operation] = &[Operation::new("power_on", nothing)];
    const THIRD: &[Operation] = &[Operation::new("blink", nothing)];
    const TWICE: &[Operation] = &[
        Operation::new("blink", nothing),
        Operation::new("blink", nothing),
    ];

    #[test]
    fn collisions_are_rejected() {
        let mut registry = Registry::new();
        registry.register(Group("first", FIRST)).unwrap();

        let result = registry.register(Group("second", SECOND));

        assert_eq!(
            result,
            Err(ConfigurationError::DuplicateOperation {
                name: "power_on",
                first: "first",
                second: "second",
            })
        );
        assert_eq!(registry.group_names().collect::<Vec<_>>(), vec!["first"]);
    }

    #[test]
    fn collisions_within_a_group_are_rejected() {
        let mut registry = Registry::new();

        assert!(matches!(
            registry.register(Group("twice", TWICE)),
            Err(ConfigurationError::DuplicateOperation { name: "blink", .. })
        ));
        assert!(registry.resolve("blink").is_none());
    }

    #[test]
    fn resolution() {
        let mut registry = Registry::new();
        registry.register(Group("first", FIRST)).unwrap();
        registry.register(Group("third", THIRD)).unwrap();

        let (group, operation) = registry.resolve("blink").unwrap();
        assert_eq!(group.name(), "third");
        assert_eq!(operation.name(), "blink");
        assert!(registry.resolve("missing").is_none());

        assert_eq!(
            registry.operation_names().collect::<Vec<_>>(),
            vec!["reset", "power_on", "blink"]
        );
    }

    #[test]
    fn argument_count() {
        assert_eq!(expect_args::<2>("op", &[1, 2]).unwrap(), [1, 2]);

        match expect_args::<2>("op", &[1]) {
            Err(IpmiError::InvalidArguments { operation, reason }) => {
                assert_eq!(operation, "op");
                assert_eq!(reason, "expected 2 argument(s), got 1");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
