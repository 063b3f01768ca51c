// Copyright (c) 2022-2023 The FIO Protocol

//! Host-side transaction validation
//!
//! Everything here runs before any device I/O. A [`Transaction`] is checked
//! structurally (exactly one action, no context-free actions, a single
//! authorization) and its header fields are converted to their wire
//! encodings. The `(account, name)` pair of the action is resolved against a
//! static table and must agree with the [`ActionData`] variant supplied.

use ledger_fio_apdu::{
    name::Name,
    serialize::{date_to_buf, uint16_to_buf, uint32_to_buf},
};

use crate::{
    error::{validate, Error, InvalidDataReason},
    types::{ActionData, Transaction},
};

/// Largest u64 as a decimal string, for lexicographic range checks
const MAX_UINT64_STR: &str = "18446744073709551615";

/// Supported `(account, name)` pairs, in contract order
static SUPPORTED_ACTIONS: &[(&str, &str)] = &[
    ("fio.token", "trnsfiopubky"),
    ("fio.reqobt", "newfundsreq"),
    ("fio.reqobt", "recordobt"),
    ("fio.reqobt", "rejectfndreq"),
    ("fio.reqobt", "cancelfndreq"),
    ("fio.address", "addaddress"),
    ("fio.address", "remaddress"),
    ("fio.address", "remalladdr"),
    ("fio.address", "addnft"),
    ("fio.address", "remallnfts"),
    ("fio.address", "regaddress"),
    ("fio.address", "xferaddress"),
    ("fio.address", "regdomain"),
    ("fio.address", "renewdomain"),
    ("fio.address", "xferdomain"),
    ("fio.address", "setdomainpub"),
    ("fio.staking", "stakefio"),
    ("fio.staking", "unstakefio"),
    ("eosio", "voteproducer"),
];

/// Contract pair a given payload variant belongs to
fn expected_contract(data: &ActionData) -> (&'static str, &'static str) {
    match data {
        ActionData::TransferTokens(_) => ("fio.token", "trnsfiopubky"),
        ActionData::RequestFunds(_) => ("fio.reqobt", "newfundsreq"),
        ActionData::RecordObt(_) => ("fio.reqobt", "recordobt"),
        ActionData::RejectFundsRequest(_) => ("fio.reqobt", "rejectfndreq"),
        ActionData::CancelFundsRequest(_) => ("fio.reqobt", "cancelfndreq"),
        ActionData::AddAddress(_) => ("fio.address", "addaddress"),
        ActionData::RemoveAddress(_) => ("fio.address", "remaddress"),
        ActionData::RemoveAllAddresses(_) => ("fio.address", "remalladdr"),
        ActionData::AddNft(_) => ("fio.address", "addnft"),
        ActionData::RemoveAllNfts(_) => ("fio.address", "remallnfts"),
        ActionData::RegisterAddress(_) => ("fio.address", "regaddress"),
        ActionData::TransferAddress(_) => ("fio.address", "xferaddress"),
        ActionData::RegisterDomain(_) => ("fio.address", "regdomain"),
        ActionData::RenewDomain(_) => ("fio.address", "renewdomain"),
        ActionData::TransferDomain(_) => ("fio.address", "xferdomain"),
        ActionData::SetDomainPublic(_) => ("fio.address", "setdomainpub"),
        ActionData::Stake(_) => ("fio.staking", "stakefio"),
        ActionData::Unstake(_) => ("fio.staking", "unstakefio"),
        ActionData::VoteProducer(_) => ("eosio", "voteproducer"),
    }
}

/// Validated transaction with header fields in wire encoding
pub(crate) struct ParsedTransaction<'a> {
    /// Expiration as little-endian epoch seconds
    pub expiration: [u8; 4],
    pub ref_block_num: [u8; 2],
    pub ref_block_prefix: [u8; 4],
    pub action: ParsedAction<'a>,
}

pub(crate) struct ParsedAction<'a> {
    pub account: Name,
    pub name: Name,
    pub actor: Name,
    pub permission: Name,
    pub data: &'a ActionData,
}

pub(crate) fn parse_transaction(tx: &Transaction) -> Result<ParsedTransaction<'_>, Error> {
    validate(
        tx.context_free_actions.is_empty(),
        InvalidDataReason::ContextFreeActionsNotSupported,
    )?;
    validate(
        tx.actions.len() == 1,
        InvalidDataReason::MultipleActionsNotSupported,
    )?;
    let action = &tx.actions[0];
    validate(
        action.authorization.len() == 1,
        InvalidDataReason::MultipleAuthorizationNotSupported,
    )?;
    let authorization = &action.authorization[0];

    validate(
        SUPPORTED_ACTIONS
            .iter()
            .any(|&(account, name)| account == action.account && name == action.name),
        InvalidDataReason::ActionNotSupported,
    )?;
    let (account, name) = expected_contract(&action.data);
    validate(
        account == action.account && name == action.name,
        InvalidDataReason::ActionDataMismatch,
    )?;

    let expiration =
        date_to_buf(&tx.expiration).map_err(|_| InvalidDataReason::InvalidExpiration)?;

    Ok(ParsedTransaction {
        expiration,
        ref_block_num: uint16_to_buf(tx.ref_block_num),
        ref_block_prefix: uint32_to_buf(tx.ref_block_prefix),
        action: ParsedAction {
            account: parse_name(&action.account, InvalidDataReason::InvalidAccount)?,
            name: parse_name(&action.name, InvalidDataReason::InvalidName)?,
            actor: parse_name(&authorization.actor, InvalidDataReason::InvalidActor)?,
            permission: parse_name(&authorization.permission, InvalidDataReason::InvalidPermission)?,
            data: &action.data,
        },
    })
}

pub(crate) fn parse_name(name: &str, reason: InvalidDataReason) -> Result<Name, Error> {
    Name::parse(name).map_err(|_| reason.into())
}

fn is_uint_str(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_UINT64_STR.len() {
        return false;
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if value.len() > 1 && value.starts_with('0') {
        return false;
    }
    value.len() < MAX_UINT64_STR.len() || value <= MAX_UINT64_STR
}

/// Parse a decimal amount string into a u64; amounts travel as strings to
/// avoid precision loss in JSON layers
pub(crate) fn parse_uint64_str(value: &str, reason: InvalidDataReason) -> Result<u64, Error> {
    validate(is_uint_str(value), reason)?;
    value.parse::<u64>().map_err(|_| reason.into())
}

/// Printable ASCII with inclusive length bounds
pub(crate) fn validate_ascii(
    value: &str,
    min: usize,
    max: usize,
    reason: InvalidDataReason,
) -> Result<(), Error> {
    validate(
        value.len() >= min
            && value.len() <= max
            && value.bytes().all(|b| (0x20..=0x7e).contains(&b)),
        reason,
    )
}

/// 32-byte chain id supplied as 64 hex characters
pub(crate) fn parse_chain_id(chain_id: &str) -> Result<[u8; 32], Error> {
    let bytes = hex::decode(chain_id).map_err(|_| InvalidDataReason::InvalidChainId)?;
    bytes
        .try_into()
        .map_err(|_| InvalidDataReason::InvalidChainId.into())
}

/// Uncompressed SECP256k1 point supplied as 130 hex characters
pub(crate) fn parse_dh_public_key(key: &str) -> Result<Vec<u8>, Error> {
    let bytes = hex::decode(key).map_err(|_| InvalidDataReason::InvalidPublicKey)?;
    validate(
        bytes.len() == 65 && bytes[0] == 0x04,
        InvalidDataReason::InvalidPublicKey,
    )?;
    Ok(bytes)
}
