// Copyright (c) 2022-2023 The FIO Protocol

//! Error taxonomy
//!
//! Validation failures are raised host-side before any device I/O; device
//! status errors wrap the raw status word with a looked-up message; version
//! incompatibility is reported before the gated operation runs.

use ledger_fio_apdu::{status::StatusCode, ProtocolError};
use thiserror::Error;

use crate::types::Version;

/// Reason for rejecting user-supplied input
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidDataReason {
    #[error("invalid chain id")]
    InvalidChainId,

    #[error("context free actions not supported")]
    ContextFreeActionsNotSupported,
    #[error("multiple actions not supported")]
    MultipleActionsNotSupported,
    #[error("multiple authorization not supported")]
    MultipleAuthorizationNotSupported,
    #[error("action not supported")]
    ActionNotSupported,
    #[error("action data does not match action name")]
    ActionDataMismatch,

    #[error("invalid expiration")]
    InvalidExpiration,
    #[error("invalid account")]
    InvalidAccount,
    #[error("invalid name")]
    InvalidName,
    #[error("invalid actor")]
    InvalidActor,
    #[error("invalid permission")]
    InvalidPermission,

    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid max fee")]
    InvalidMaxFee,
    #[error("invalid tpid")]
    InvalidTpid,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid FIO address")]
    InvalidFioAddress,
    #[error("invalid FIO domain")]
    InvalidFioDomain,
    #[error("invalid payer FIO address")]
    InvalidPayerFioAddress,
    #[error("invalid payee FIO address")]
    InvalidPayeeFioAddress,
    #[error("invalid public address")]
    InvalidPublicAddress,
    #[error("invalid chain code")]
    InvalidChainCode,
    #[error("invalid token code")]
    InvalidTokenCode,
    #[error("invalid memo")]
    InvalidMemo,
    #[error("invalid hash")]
    InvalidHash,
    #[error("invalid offline url")]
    InvalidOfflineUrl,
    #[error("invalid request id")]
    InvalidRequestId,
    #[error("invalid status")]
    InvalidStatus,
    #[error("invalid obt id")]
    InvalidObtId,
    #[error("invalid nft url")]
    InvalidUrl,
    #[error("invalid nft hash")]
    InvalidNftHash,
    #[error("invalid nft metadata")]
    InvalidMetadata,
    #[error("invalid contract address")]
    InvalidContractAddress,
    #[error("invalid token id")]
    InvalidTokenId,
    #[error("invalid owner public key")]
    InvalidOwnerPublicKey,
    #[error("incorrect number of public addresses")]
    IncorrectNumberOfPublicAddresses,
    #[error("incorrect number of nfts")]
    IncorrectNumberOfNfts,
    #[error("incorrect number of producers")]
    IncorrectNumberOfProducers,
    #[error("invalid producer")]
    InvalidProducer,
    #[error("invalid message")]
    InvalidMessage,
}

/// Top-level library error
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed host-side validation; no device I/O was attempted
    #[error("invalid data: {0}")]
    InvalidData(#[from] InvalidDataReason),

    /// Device reported a non-success status word
    #[error("device error: {0}")]
    DeviceStatus(StatusCode),

    /// Connected app version is outside the supported window
    #[error("unsupported app version {}.{}.{}", .0.major, .0.minor, .0.patch)]
    UnsupportedVersion(Version),

    /// Wire-level invariant violation: template or codec bug, or a
    /// malformed device response
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Signing stream ran to completion without a FINISH response
    #[error("signing stream finished without a FINISH response")]
    IncompleteSigningStream,

    /// Underlying transport failure
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Fail with the given reason unless the condition holds
pub(crate) fn validate(cond: bool, reason: InvalidDataReason) -> Result<(), Error> {
    if cond {
        Ok(())
    } else {
        Err(Error::InvalidData(reason))
    }
}
