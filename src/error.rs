use core::fmt;

/// An error type for the controller-side exchange operations.
///
/// The device state machine is total over its events and has no failure
/// conditions of its own; errors only arise on the bus-driving side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.kind.as_str())
    }
}

/// A list of specific error causes. Each kind is converted into `Error` type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// bad argument (out of range split point, duplicate bind, ...)
    BadParam,
    /// the device did not acknowledge its bus address
    CommFail,
    /// read-back bytes differ from the payload that was written
    DataMismatch,
    /// payload or buffer exceeds the 256 byte memory
    InvalidSize,
    /// failed to read
    RxFail,
    /// timed out while waiting for the bus
    Timeout,
    /// failed to write
    TxFail,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            BadParam => "bad argument (out of range, duplicate bind, etc.)",
            CommFail => "device did not acknowledge its address, check your wiring",
            DataMismatch => "read-back differs from the written payload",
            InvalidSize => "count value is out of range or greater than buffer size",
            RxFail => "failed to read",
            Timeout => "timed out while waiting for the bus",
            TxFail => "failed to write",
        }
    }
}
