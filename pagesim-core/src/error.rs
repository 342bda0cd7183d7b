/*!
Specialized `Error` and `Result` types for pagesim.
*/

use crate::types::Pid;

use std::{convert, error, fmt, result};

/// Specialized `Error` type for pagesim errors.
///
/// Every error is fatal to the operation that raised it; the simulator
/// performs no retries and no partial-failure recovery. The driver is
/// expected to halt the affected task (or the whole run).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Error {
    /// Generic error type containing a string
    Other(&'static str),
    /// Out of bounds.
    ///
    /// An access at `position` fell outside a store of `size` bytes.
    Bounds { position: usize, size: usize },
    /// Capacity error.
    ///
    /// A fixed simulation capacity was exhausted: the process table, the
    /// disk frame pool, the reservable address-space size, or the set of
    /// evictable physical frames.
    Capacity(&'static str),
    /// A process id was registered a second time.
    ProcessExists(Pid),
    /// An operation referenced a process id that was never registered.
    ProcessUnknown(Pid),
    /// Access error.
    ///
    /// A virtual address was translated for a page that was never part of
    /// the address space granted at reservation time.
    PageNotReserved { pid: Pid, vaddr: usize },
}

/// Convert from &str to error
impl convert::From<&'static str> for Error {
    fn from(error: &'static str) -> Self {
        Error::Other(error)
    }
}

impl Error {
    /// Returns a simple string representation of the error kind.
    pub fn to_str(self) -> &'static str {
        match self {
            Error::Other(_) => "other error",
            Error::Bounds { .. } => "out of bounds",
            Error::Capacity(_) => "capacity exhausted",
            Error::ProcessExists(_) => "process already registered",
            Error::ProcessUnknown(_) => "process not registered",
            Error::PageNotReserved { .. } => "page not part of the reserved address space",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Other(e) => write!(f, "{}: {}", self.to_str(), e),
            Error::Bounds { position, size } => {
                write!(f, "{}: position {} in a store of {} bytes", self.to_str(), position, size)
            }
            Error::Capacity(e) => write!(f, "{}: {}", self.to_str(), e),
            Error::ProcessExists(pid) => write!(f, "{}: pid {}", self.to_str(), pid),
            Error::ProcessUnknown(pid) => write!(f, "{}: pid {}", self.to_str(), pid),
            Error::PageNotReserved { pid, vaddr } => {
                write!(f, "{}: pid {} at virtual address {}", self.to_str(), pid, vaddr)
            }
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        self.to_str()
    }
}

/// Specialized `Result` type for pagesim results.
pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn display_carries_offender() {
        let err = Error::Bounds { position: 70000, size: 65536 };
        assert_eq!(err.to_str(), "out of bounds");
        assert!(err.to_string().contains("70000"));

        let err = Error::PageNotReserved { pid: 3, vaddr: 12800 };
        assert!(err.to_string().contains("pid 3"));
        assert!(err.to_string().contains("12800"));
    }

    #[test]
    pub fn from_str() {
        let err: Error = "something odd".into();
        assert_eq!(err, Error::Other("something odd"));
    }
}
