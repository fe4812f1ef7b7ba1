use std::error;
use std::fmt;
use std::io;
use std::result;

pub type Result<T> = result::Result<T, Error>;

/// The error taxonomy for the generator: every failure is one of a
/// malformed input (`Input`), a violated internal invariant that the
/// pipeline itself asserts (`Invariant`), or an I/O failure, a clap usage
/// error, or a UCD parse error surfaced from `ucd_parse`.
///
/// All variants are fatal: the generator has no retry policy, since its
/// inputs are local files that either parse or don't.
#[derive(Debug)]
pub enum Error {
    /// A malformed UCD line, unparseable hex value, or missing required
    /// field that `ucd_parse` did not already catch.
    Input(String),
    /// A violated invariant of the pipeline itself: an interesting-codepoint
    /// table that overflowed its 15-bit index, a decomposition sequence
    /// whose offset or length is out of bounds, a DUCET key/value whose bit
    /// budget is exceeded, or a table value that doesn't fit its chosen
    /// width.
    Invariant(String),
    Io(io::Error),
    Clap(clap::Error),
    UcdParse(ucd_parse::Error),
}

impl Error {
    pub fn is_broken_pipe(&self) -> bool {
        match *self {
            Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe => true,
            _ => false,
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Clap(ref err) => Some(err),
            Error::UcdParse(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Input(ref msg) => write!(f, "{}", msg),
            Error::Invariant(ref msg) => write!(f, "{}", msg),
            Error::Io(ref err) => err.fmt(f),
            Error::Clap(ref err) => err.fmt(f),
            Error::UcdParse(ref err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<clap::Error> for Error {
    fn from(err: clap::Error) -> Error {
        Error::Clap(err)
    }
}

impl From<ucd_parse::Error> for Error {
    fn from(err: ucd_parse::Error) -> Error {
        Error::UcdParse(err)
    }
}
