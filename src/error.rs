use crate::exception::ExceptionCode;
use crate::store::StoreError;

/// errors that occur while validating the MBAP framing of a request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// received a frame shorter than the minimum request size
    InvalidLength(usize),
    /// received a frame with a non-Modbus protocol id
    UnknownProtocolId(u16),
    /// the MBAP length field promises more bytes than the frame contains
    BadLengthField(u16, usize),
}

impl std::error::Error for FrameError {}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FrameError::InvalidLength(size) => {
                write!(f, "invalid frame length: {size}")
            }
            FrameError::UnknownProtocolId(id) => {
                write!(f, "received frame with non-Modbus protocol id: {id}")
            }
            FrameError::BadLengthField(field, actual) => write!(
                f,
                "MBAP length field of {field} disagrees with actual frame length of {actual}"
            ),
        }
    }
}

/// Umbrella error type surfaced by the server, the parser and the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// MBAP framing of the request was invalid
    Frame(FrameError),
    /// the PDU was malformed or a handler rejected the request
    Exception(ExceptionCode),
    /// no built-in or custom handler is registered for the function code
    NoHandler(u8),
    /// the store rejected the operation
    Store(StoreError),
    /// an I/O error occurred while reading, writing or accepting
    Io(std::io::ErrorKind),
    /// the server was started twice or started after shutdown
    InvalidState,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Frame(err) => err.fmt(f),
            Error::Exception(ex) => ex.fmt(f),
            Error::NoHandler(code) => write!(f, "no handler for function code {code:#04X}"),
            Error::Store(err) => err.fmt(f),
            Error::Io(kind) => write!(f, "i/o error: {kind:?}"),
            Error::InvalidState => f.write_str("server has already been started or shut down"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        Error::Frame(err)
    }
}

impl From<ExceptionCode> for Error {
    fn from(ex: ExceptionCode) -> Self {
        Error::Exception(ex)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.kind())
    }
}
