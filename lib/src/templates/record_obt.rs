// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.reqobt::recordobt`
//!
//! Same shape as the funds request template with the request id up front and
//! the OBT payment details (both public addresses, status, obt id) inside
//! the DH sub-stream.

use ledger_fio_apdu::command::{self, Command, DEFAULT_MAX_LENGTH};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{parse_dh_public_key, parse_uint64_str, validate_ascii, ParsedAction},
    types::RecordObtData,
};

use super::{action_header, actor_decode_name_section, fio_amount_show, memo_and_hash, tpid_section};

const DH_SECTION_MIN: u64 = 64;
const DH_SECTION_MAX: u64 = 432;

fn string_section(key: &'static str, value: &str) -> Vec<Command> {
    command::counted_section(vec![command::append_string_show(
        key,
        value.as_bytes(),
        0,
        DEFAULT_MAX_LENGTH,
    )])
}

pub(super) fn commands(action: &ParsedAction, data: &RecordObtData) -> Result<Vec<Command>, Error> {
    validate_ascii(
        &data.fio_request_id,
        0,
        64,
        InvalidDataReason::InvalidRequestId,
    )?;
    validate_ascii(
        &data.payer_fio_address,
        3,
        64,
        InvalidDataReason::InvalidPayerFioAddress,
    )?;
    validate_ascii(
        &data.payee_fio_address,
        3,
        64,
        InvalidDataReason::InvalidPayeeFioAddress,
    )?;
    validate_ascii(
        &data.payer_public_address,
        1,
        128,
        InvalidDataReason::InvalidPublicAddress,
    )?;
    validate_ascii(
        &data.payee_public_address,
        1,
        128,
        InvalidDataReason::InvalidPublicAddress,
    )?;
    parse_uint64_str(&data.amount, InvalidDataReason::InvalidAmount)?;
    validate_ascii(&data.chain_code, 1, 10, InvalidDataReason::InvalidChainCode)?;
    validate_ascii(&data.token_code, 1, 10, InvalidDataReason::InvalidTokenCode)?;
    validate_ascii(&data.status, 1, 64, InvalidDataReason::InvalidStatus)?;
    validate_ascii(&data.obt_id, 0, 128, InvalidDataReason::InvalidObtId)?;
    let peer_public_key = parse_dh_public_key(&data.payee_public_key)?;

    let mut encrypted = Vec::new();
    encrypted.extend(string_section("Payer Public Addr.", &data.payer_public_address));
    encrypted.extend(string_section("Payee Public Addr.", &data.payee_public_address));
    encrypted.extend(string_section("Amount requested", &data.amount));
    encrypted.extend(command::counted_section(vec![command::append_string_show(
        "Chain code",
        data.chain_code.as_bytes(),
        1,
        10,
    )]));
    encrypted.extend(command::counted_section(vec![command::append_string_show(
        "Token code",
        data.token_code.as_bytes(),
        1,
        10,
    )]));
    encrypted.extend(string_section("Status", &data.status));
    encrypted.extend(string_section("Obt ID", &data.obt_id));
    encrypted.extend(memo_and_hash(&data.memo, &data.hash, &data.offline_url)?);

    let mut inner = Vec::new();
    inner.extend(string_section("Fio Request ID", &data.fio_request_id));
    inner.extend(command::counted_section(vec![command::append_string_show(
        "Payer FIO Address",
        data.payer_fio_address.as_bytes(),
        3,
        64,
    )]));
    inner.extend(command::counted_section(vec![command::append_string_show(
        "Payee FIO Address",
        data.payee_fio_address.as_bytes(),
        3,
        64,
    )]));
    inner.extend(command::counted_section_bounded(
        command::dh_encryption_section(&peer_public_key, encrypted),
        DH_SECTION_MIN,
        DH_SECTION_MAX,
    ));
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.extend(actor_decode_name_section(&data.actor)?);
    inner.extend(tpid_section(&data.tpid)?);

    let mut commands = action_header(action, "Record other blockchain transaction metadata");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}
