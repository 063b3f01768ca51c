// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.reqobt::rejectfndreq` and `fio.reqobt::cancelfndreq`

use ledger_fio_apdu::command::{self, Command, DEFAULT_MAX_LENGTH};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::FundsRequestOpData,
};

use super::{action_header, actor_decode_name_section, fio_amount_show, tpid_section, tpid_with_length};

fn checked_request_id(data: &FundsRequestOpData) -> Result<&str, Error> {
    validate_ascii(
        &data.fio_request_id,
        1,
        64,
        InvalidDataReason::InvalidRequestId,
    )?;
    Ok(&data.fio_request_id)
}

pub(super) fn reject(
    action: &ParsedAction,
    data: &FundsRequestOpData,
) -> Result<Vec<Command>, Error> {
    let request_id = checked_request_id(data)?;

    let mut inner = Vec::new();
    inner.extend(command::counted_section(vec![command::append_string_show(
        "Request ID",
        request_id.as_bytes(),
        0,
        DEFAULT_MAX_LENGTH,
    )]));
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.extend(actor_decode_name_section(&data.actor)?);
    inner.extend(tpid_section(&data.tpid)?);

    let mut commands = action_header(action, "Reject funds request");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

// Cancel serializes the request id as a length-prefixed string field rather
// than its own counted section
pub(super) fn cancel(
    action: &ParsedAction,
    data: &FundsRequestOpData,
) -> Result<Vec<Command>, Error> {
    let request_id = checked_request_id(data)?;

    let mut inner = vec![command::append_string_with_length_show(
        "Request ID",
        request_id.as_bytes(),
        0,
        DEFAULT_MAX_LENGTH,
    )];
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.extend(actor_decode_name_section(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, "Cancel funds request");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}
