//! Error classification shared by the crate's error enums.

/// Grepable error code and retryable flag for surfacing failures to a host.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
