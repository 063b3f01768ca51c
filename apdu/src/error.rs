// Copyright (c) 2022-2023 The FIO Protocol

use thiserror::Error;

/// Protocol-level errors
///
/// These signal bugs in stream compilation or malformed device responses,
/// never recoverable runtime conditions.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProtocolError {
    /// Command payload does not fit in a single APDU
    #[error("APDU payload too large ({0} > {} bytes)", crate::MAX_APDU_PAYLOAD)]
    PayloadTooLarge(usize),

    /// Expiration string is not an ISO-8601 date
    #[error("invalid expiration date")]
    InvalidDate,

    /// Name string violates the [1-5a-z.]{{1,12}} alphabet
    #[error("invalid name string")]
    InvalidName,

    /// BIP32 path longer than the supported five components
    #[error("invalid BIP32 path")]
    InvalidPath,

    /// Buffer shorter than the sum of declared chunk lengths
    #[error("buffer too short for declared chunk lengths")]
    ChunkUnderflow,

    /// Device response length differs from the expected length
    #[error("unexpected response length: {got} instead of {expected}")]
    ResponseLength { got: usize, expected: usize },

    /// Device response is not valid UTF-8 where text was expected
    #[error("response is not valid utf-8")]
    Utf8,
}
