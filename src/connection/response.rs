use crate::{
    error::{SendError, TransportError},
    fmt::{LogItem, Loggable},
    log_vec,
};

use super::CompletionCode;

/// An IPMI response: a completion code and, unless the transport reported
/// a failed exchange, the response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    completion_code: u8,
    data: Option<Vec<u8>>,
}

impl Response {
    /// A response to an exchange that the transport completed.
    pub fn new(completion_code: u8, data: Vec<u8>) -> Self {
        Self {
            completion_code,
            data: Some(data),
        }
    }

    /// A response that only carries the code a transport reported for a
    /// failed exchange. Such a response never has data.
    pub fn code_only(completion_code: u8) -> Self {
        Self {
            completion_code,
            data: None,
        }
    }

    /// Get the raw completion code for the response.
    pub fn cc(&self) -> u8 {
        self.completion_code
    }

    pub fn completion_code(&self) -> CompletionCode {
        self.completion_code.into()
    }

    pub fn is_success(&self) -> bool {
        self.completion_code == 0
    }

    /// The response data (does not include the completion code).
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn into_parts(self) -> (u8, Option<Vec<u8>>) {
        (self.completion_code, self.data)
    }
}

impl Loggable for Response {
    fn as_log(&self) -> Vec<LogItem> {
        let data = match &self.data {
            Some(data) => format!("{data:02X?}"),
            None => "none".into(),
        };

        log_vec![
            (0, "IPMI response"),
            (1, "Completion code", format!("0x{:02X}", self.completion_code)),
            (1, "Data", data),
        ]
    }
}

/// What a transport observed when exchanging one request.
///
/// Every transport has to tell these outcomes apart; [`Exchange::into_response`]
/// turns them into the result the rest of the crate works with.
#[derive(Debug)]
pub enum Exchange {
    /// The command was accepted and a completion code is present.
    Completed { completion_code: u8, data: Vec<u8> },
    /// The transport could not complete the exchange, but reported a
    /// response code for it.
    Rejected { completion_code: u8 },
    /// The remote side never responded.
    TimedOut,
    /// The transport itself failed.
    Failed(TransportError),
}

impl Exchange {
    pub fn into_response(self) -> Result<Response, SendError> {
        match self {
            Exchange::Completed {
                completion_code,
                data,
            } => Ok(Response::new(completion_code, data)),
            Exchange::Rejected { completion_code } => Ok(Response::code_only(completion_code)),
            Exchange::TimedOut => Err(SendError::Timeout),
            Exchange::Failed(e) => Err(SendError::Transport(e)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn completed_keeps_data() {
        let response = Exchange::Completed {
            completion_code: 0,
            data: vec![0x20, 0x01, 0x80],
        }
        .into_response()
        .unwrap();

        assert!(response.is_success());
        assert_eq!(response.data(), Some(&[0x20, 0x01, 0x80][..]));
    }

    #[test]
    fn rejected_has_no_data() {
        let response = Exchange::Rejected {
            completion_code: 0xC1,
        }
        .into_response()
        .unwrap();

        assert_eq!(response.into_parts(), (0xC1, None));
    }

    #[test]
    fn timeout_is_an_error() {
        assert!(matches!(
            Exchange::TimedOut.into_response(),
            Err(SendError::Timeout)
        ));
    }

    #[test]
    fn failure_carries_status() {
        let failed = Exchange::Failed(TransportError::Failed {
            status: Some(1),
            output: "Error: Unable to establish LAN session".into(),
        });

        match failed.into_response() {
            Err(SendError::Transport(TransportError::Failed { status, .. })) => {
                assert_eq!(status, Some(1))
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
