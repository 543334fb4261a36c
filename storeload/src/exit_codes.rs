#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Invalid CLI/config values (bad flags, malformed target or date, empty ranges).
    InvalidInput = 30,

    /// Internal/runtime error (report file IO, client setup, a store worker panicked).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
