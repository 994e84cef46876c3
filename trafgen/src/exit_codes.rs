#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The run finished. A high request failure rate is still a success.
    Success = 0,

    /// Invalid CLI/config input (bad flags, out-of-range probabilities, unreadable site files).
    InvalidInput = 30,

    /// Internal/runtime error (log directory IO, probe with no reachable site, task failures).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
