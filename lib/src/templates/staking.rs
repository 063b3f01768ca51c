// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.staking::stakefio` and `fio.staking::unstakefio`

use ledger_fio_apdu::command::{self, Command};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::StakeData,
};

use super::{action_header, actor_compare, fio_amount_show, tpid_with_length};

/// Staking and unstaking share a layout; the actor field serializes after
/// the tpid here, unlike the other `fio.address` actions
pub(super) fn commands(
    action: &ParsedAction,
    data: &StakeData,
    label: &str,
) -> Result<Vec<Command>, Error> {
    validate_ascii(&data.fio_address, 3, 64, InvalidDataReason::InvalidFioAddress)?;

    let mut inner = vec![command::append_string_with_length_show(
        "FIO Cr. Handle",
        data.fio_address.as_bytes(),
        3,
        64,
    )];
    inner.push(fio_amount_show(
        "Amount",
        &data.amount,
        InvalidDataReason::InvalidAmount,
    )?);
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(tpid_with_length(&data.tpid)?);
    inner.push(actor_compare(&data.actor)?);

    let mut commands = action_header(action, label);
    commands.extend(command::counted_section(inner));
    Ok(commands)
}
