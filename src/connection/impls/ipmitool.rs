//! A transport that drives the `ipmitool` command line tool.
//!
//! Every request is sent with a separate `ipmitool raw` invocation, using
//! the parameters recorded when the session was established.

use std::{path::PathBuf, process::Command, sync::LazyLock};

use regex::Regex;

use crate::{
    connection::{Exchange, Request, Response, Transport},
    error::{ConfigurationError, SendError, TransportError},
    session::{AuthType, Credentials, Session},
    target::{Bridging, Target},
};

static RAW_REJECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Unable to send RAW command \(.*rsp=(0x[0-9a-fA-F]+)\)")
        .expect("hardcoded regex pattern is valid")
});

static RAW_TIMEOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Unable to send RAW command \(.*cmd=0x[0-9a-fA-F]+\)")
        .expect("hardcoded regex pattern is valid")
});

/// What is remembered of a session between requests.
#[derive(Debug, Clone, PartialEq)]
struct SessionParameters {
    host: String,
    auth_type: AuthType,
    credentials: Option<Credentials>,
}

#[derive(Debug, Clone)]
pub struct Ipmitool {
    path: PathBuf,
    interface: String,
    session: Option<SessionParameters>,
}

impl Default for Ipmitool {
    fn default() -> Self {
        Self::new()
    }
}

impl Ipmitool {
    pub const DEFAULT_PATH: &'static str = "ipmitool";
    pub const DEFAULT_INTERFACE: &'static str = "lan";

    pub fn new() -> Self {
        Self {
            path: PathBuf::from(Self::DEFAULT_PATH),
            interface: Self::DEFAULT_INTERFACE.to_string(),
            session: None,
        }
    }

    /// Use the `ipmitool` executable at `path`.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Select the `ipmitool` interface (`-I`), e.g. `lanplus`.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Build the `ipmitool` arguments that send `request` to `target`.
    pub fn arguments(
        &self,
        target: &Target,
        request: &Request,
    ) -> Result<Vec<String>, ConfigurationError> {
        let session = self
            .session
            .as_ref()
            .ok_or(ConfigurationError::SessionNotEstablished)?;

        let mut args: Vec<String> = vec![
            "-I".into(),
            self.interface.clone(),
            "-H".into(),
            session.host.clone(),
        ];

        match target.bridging()? {
            Bridging::Direct => {}
            // ipmitool bridges implicitly through the shelf manager
            Bridging::Single { channel } => {
                args.extend(["-b".into(), channel.value().to_string()]);
            }
            Bridging::Double {
                transit_channel,
                transit_address,
                channel,
            } => {
                args.extend([
                    "-B".into(),
                    transit_channel.value().to_string(),
                    "-T".into(),
                    format!("0x{:02x}", transit_address.0),
                    "-b".into(),
                    channel.value().to_string(),
                ]);
            }
        }

        args.extend(["-t".into(), format!("0x{:02x}", target.address().0)]);

        match (session.auth_type, &session.credentials) {
            (AuthType::None, _) => args.extend(["-P".into(), String::new()]),
            (AuthType::Password, Some(credentials)) => args.extend([
                "-U".into(),
                credentials.username().to_string(),
                "-P".into(),
                credentials.password().to_string(),
            ]),
            (AuthType::Password, None) => return Err(ConfigurationError::MissingCredentials),
            (other, _) => return Err(ConfigurationError::UnsupportedAuthType(other)),
        }

        args.extend([
            "-l".into(),
            request.lun().value().to_string(),
            "raw".into(),
            format!("0x{:02x}", request.netfn_raw()),
        ]);
        args.extend(request.as_bytes()[1..].iter().map(|b| format!("0x{b:02x}")));

        Ok(args)
    }

    /// Classify the output of an `ipmitool raw` invocation.
    ///
    /// `status` is the exit code, or `None` if the process was terminated
    /// by a signal.
    pub fn classify(stdout: &str, stderr: &str, status: Option<i32>) -> Exchange {
        let diagnostics = format!("{stderr}{stdout}");

        if let Some(captures) = RAW_REJECTED.captures(&diagnostics) {
            let code = &captures[1];

            return match u8::from_str_radix(&code[2..], 16) {
                Ok(completion_code) => Exchange::Rejected { completion_code },
                Err(_) => Exchange::Failed(TransportError::MalformedResponse(format!(
                    "response code {code} out of range"
                ))),
            };
        }

        if RAW_TIMEOUT.is_match(&diagnostics) {
            return Exchange::TimedOut;
        }

        if status != Some(0) {
            return Exchange::Failed(TransportError::Failed {
                status,
                output: diagnostics.trim().to_string(),
            });
        }

        let data: Result<Vec<u8>, _> = stdout
            .split_whitespace()
            .map(|byte| {
                u8::from_str_radix(byte, 16)
                    .map_err(|_| TransportError::MalformedResponse(format!("unexpected `{byte}`")))
            })
            .collect();

        match data {
            Ok(data) => Exchange::Completed {
                completion_code: 0,
                data,
            },
            Err(e) => Exchange::Failed(e),
        }
    }

    fn run(&self, args: &[String]) -> Result<Exchange, TransportError> {
        log::debug!("Run {} {}", self.path.display(), redacted(args));

        let output = Command::new(&self.path).args(args).output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        log::trace!(
            "ipmitool returned with {:?}, stdout: {:?}, stderr: {:?}",
            output.status.code(),
            stdout,
            stderr
        );

        Ok(Self::classify(&stdout, &stderr, output.status.code()))
    }
}

/// Render `args` for logging, hiding the password.
fn redacted(args: &[String]) -> String {
    let mut hide_next = false;

    args.iter()
        .map(|arg| {
            let shown = if hide_next { "****" } else { arg.as_str() };
            hide_next = arg == "-P";
            shown
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Transport for Ipmitool {
    fn establish_session(&mut self, session: &Session) -> Result<(), SendError> {
        let host = session
            .transport_endpoint()
            .ok_or(ConfigurationError::NoEndpoint)?;

        // ipmitool opens a session per invocation, so the parameters are
        // only recorded here.
        self.session = Some(SessionParameters {
            host: host.to_string(),
            auth_type: session.auth_type(),
            credentials: session.credentials().cloned(),
        });

        Ok(())
    }

    fn close_session(&mut self, _: &Session) -> Result<(), SendError> {
        self.session = None;
        Ok(())
    }

    fn send_and_receive(
        &mut self,
        target: &Target,
        request: &Request,
    ) -> Result<Response, SendError> {
        let args = self.arguments(target, request)?;
        self.run(&args)?.into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::connection::{shared, LogicalUnit, NetFn};

    fn established(configure: impl FnOnce(&mut Session)) -> Ipmitool {
        let mut session = Session::new();
        session.set_transport_endpoint("shelf");
        configure(&mut session);

        let mut ipmitool = Ipmitool::new();
        ipmitool.establish_session(&session).unwrap();
        ipmitool
    }

    fn get_device_id() -> Request {
        Request::new(NetFn::App, LogicalUnit::Zero, 0x01, Vec::new())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn direct() {
        let ipmitool = established(|_| {});
        let target = Target::new(0x20);

        assert_eq!(
            ipmitool.arguments(&target, &get_device_id()).unwrap(),
            args(&[
                "-I", "lan", "-H", "shelf", "-t", "0x20", "-P", "", "-l", "0", "raw", "0x06", "0x01"
            ])
        );
    }

    #[test]
    fn single_bridge() {
        let ipmitool = established(|s| s.set_auth_user("admin", "secret"));
        let target = Target::with_routing(0x72, &[(0x20, 7)]).unwrap();

        assert_eq!(
            ipmitool.arguments(&target, &get_device_id()).unwrap(),
            args(&[
                "-I", "lan", "-H", "shelf", "-b", "7", "-t", "0x72", "-U", "admin", "-P", "secret",
                "-l", "0", "raw", "0x06", "0x01"
            ])
        );
    }

    #[test]
    fn double_bridge() {
        let ipmitool = established(|_| {});
        let target = Target::with_routing(0x72, &[(0x20, 7), (0x82, 0)]).unwrap();
        let request = Request::new(NetFn::Group, LogicalUnit::Two, 0x0C, vec![0x00, 0x03, 0x01]);

        assert_eq!(
            ipmitool.arguments(&target, &request).unwrap(),
            args(&[
                "-I", "lan", "-H", "shelf", "-B", "7", "-T", "0x82", "-b", "0", "-t", "0x72", "-P",
                "", "-l", "2", "raw", "0x2c", "0x0c", "0x00", "0x03", "0x01"
            ])
        );
    }

    #[test]
    fn session_required() {
        let ipmitool = Ipmitool::new();

        assert_eq!(
            ipmitool.arguments(&Target::new(0x20), &get_device_id()),
            Err(ConfigurationError::SessionNotEstablished)
        );
    }

    #[test]
    fn endpoint_required() {
        let mut ipmitool = Ipmitool::new();

        assert!(matches!(
            ipmitool.establish_session(&Session::new()),
            Err(SendError::Configuration(ConfigurationError::NoEndpoint))
        ));
    }

    #[test]
    fn unsupported_auth() {
        let ipmitool = established(|s| s.set_auth_type(AuthType::MD5));

        assert_eq!(
            ipmitool.arguments(&Target::new(0x20), &get_device_id()),
            Err(ConfigurationError::UnsupportedAuthType(AuthType::MD5))
        );
    }

    #[test]
    fn close_forgets_session() {
        let mut ipmitool = established(|_| {});
        ipmitool.close_session(&Session::new()).unwrap();
        assert!(!ipmitool.has_session());
    }

    #[test]
    fn session_lifecycle_through_shared_transport() {
        let transport = shared(Ipmitool::new());
        let mut session = Session::with_transport(transport);
        session.set_transport_endpoint("shelf");

        session.establish().unwrap();
        assert!(session.is_established());

        session.close().unwrap();
        assert!(!session.is_established());
    }

    #[test]
    fn classify_success() {
        match Ipmitool::classify(" 20 81 01 12\n 31\n", "", Some(0)) {
            Exchange::Completed {
                completion_code,
                data,
            } => {
                assert_eq!(completion_code, 0);
                assert_eq!(data, vec![0x20, 0x81, 0x01, 0x12, 0x31]);
            }
            other => panic!("unexpected classification {other:?}"),
        }
    }

    #[test]
    fn classify_empty_success() {
        assert!(matches!(
            Ipmitool::classify("\n", "", Some(0)),
            Exchange::Completed { completion_code: 0, data } if data.is_empty()
        ));
    }

    #[test]
    fn classify_rejected() {
        let stderr = "Unable to send RAW command (channel=0x0 netfn=0x6 lun=0x0 cmd=0x1 rsp=0xc1): Invalid command\n";

        assert!(matches!(
            Ipmitool::classify("", stderr, Some(1)),
            Exchange::Rejected {
                completion_code: 0xC1
            }
        ));
    }

    #[test]
    fn classify_timeout() {
        let stderr = "Unable to send RAW command (channel=0x7 netfn=0x6 lun=0x0 cmd=0x1)\n";

        assert!(matches!(
            Ipmitool::classify("", stderr, Some(1)),
            Exchange::TimedOut
        ));
    }

    #[test]
    fn classify_failure() {
        let stderr = "Error: Unable to establish IPMI v1.5 / RMCP session\n";

        match Ipmitool::classify("", stderr, Some(1)) {
            Exchange::Failed(TransportError::Failed { status, output }) => {
                assert_eq!(status, Some(1));
                assert_eq!(output, stderr.trim());
            }
            other => panic!("unexpected classification {other:?}"),
        }
    }

    #[test]
    fn classify_garbage() {
        assert!(matches!(
            Ipmitool::classify("20 zz", "", Some(0)),
            Exchange::Failed(TransportError::MalformedResponse(_))
        ));
    }

    /// Write an executable stand-in for `ipmitool` that records its argv
    /// into `argv` and then runs `body`.
    #[cfg(unix)]
    fn script(dir: &std::path::Path, name: &str, argv: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        let contents = format!(
            "#!/bin/sh\nfor a in \"$@\"; do printf '%s\\n' \"$a\"; done > '{}'\n{body}\n",
            argv.display()
        );

        std::fs::write(&path, contents).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn subprocess_exchanges() {
        let dir = std::env::temp_dir().join(format!("ipmitool-stand-in-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let argv = dir.join("argv");

        let rejected = "Unable to send RAW command (channel=0x0 netfn=0x6 lun=0x0 cmd=0x1 rsp=0xc1): Invalid command";
        let timed_out = "Unable to send RAW command (channel=0x7 netfn=0x6 lun=0x0 cmd=0x1)";

        let completed = script(&dir, "completed", &argv, "printf ' 20 81 01\\n'\nexit 0");
        let rejected = script(&dir, "rejected", &argv, &format!("echo '{rejected}' >&2\nexit 1"));
        let timed_out = script(
            &dir,
            "timed-out",
            &argv,
            &format!("echo '{timed_out}' >&2\nexit 1"),
        );
        let failed = script(&dir, "failed", &argv, "echo 'Error: no route to host' >&2\nexit 3");

        let send = |path: &PathBuf| {
            let mut session = Session::new();
            session.set_transport_endpoint("shelf");

            let mut ipmitool = Ipmitool::new().with_path(path);
            ipmitool.establish_session(&session).unwrap();
            ipmitool.send_and_receive(&Target::new(0x20), &get_device_id())
        };

        let response = send(&completed).unwrap();
        assert_eq!(response.into_parts(), (0x00, Some(vec![0x20, 0x81, 0x01])));

        let recorded = std::fs::read_to_string(&argv).unwrap();
        assert_eq!(
            recorded.lines().collect::<Vec<_>>(),
            vec![
                "-I", "lan", "-H", "shelf", "-t", "0x20", "-P", "", "-l", "0", "raw", "0x06", "0x01"
            ]
        );

        let response = send(&rejected).unwrap();
        assert_eq!(response.into_parts(), (0xC1, None));

        assert!(matches!(send(&timed_out), Err(SendError::Timeout)));

        match send(&failed) {
            Err(SendError::Transport(TransportError::Failed { status, output })) => {
                assert_eq!(status, Some(3));
                assert_eq!(output, "Error: no route to host");
            }
            other => panic!("unexpected result {other:?}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn password_is_redacted() {
        let line = redacted(&args(&["-U", "admin", "-P", "secret", "-t", "0x20"]));
        assert_eq!(line, "-U admin -P **** -t 0x20");
    }
}
