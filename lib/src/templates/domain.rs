// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.address` domain actions: register, renew, transfer, visibility

use ledger_fio_apdu::command::{self, Command};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::{DomainOpData, RegisterDomainData, SetDomainPublicData, TransferDomainData},
};

use super::{action_header, actor_compare, fio_amount_show, tpid_section, tpid_with_length};

fn domain_field(fio_domain: &str) -> Result<Command, Error> {
    validate_ascii(fio_domain, 1, 62, InvalidDataReason::InvalidFioDomain)?;
    Ok(command::append_string_with_length_show(
        "FIO Domain",
        fio_domain.as_bytes(),
        1,
        62,
    ))
}

fn owner_key_field(key: &str) -> Result<Command, Error> {
    validate_ascii(key, 1, 64, InvalidDataReason::InvalidOwnerPublicKey)?;
    Ok(command::append_string_with_length_show(
        "Owner Pubkey",
        key.as_bytes(),
        0,
        command::DEFAULT_MAX_LENGTH,
    ))
}

pub(super) fn register(
    action: &ParsedAction,
    data: &RegisterDomainData,
) -> Result<Vec<Command>, Error> {
    let mut inner = vec![
        domain_field(&data.fio_domain)?,
        owner_key_field(&data.owner_fio_public_key)?,
    ];
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, "Register FIO Domain");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn renew(action: &ParsedAction, data: &DomainOpData) -> Result<Vec<Command>, Error> {
    let mut inner = vec![domain_field(&data.fio_domain)?];
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, "Renew FIO Domain");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn transfer(
    action: &ParsedAction,
    data: &TransferDomainData,
) -> Result<Vec<Command>, Error> {
    validate_ascii(&data.fio_domain, 1, 62, InvalidDataReason::InvalidFioDomain)?;
    validate_ascii(
        &data.new_owner_fio_public_key,
        1,
        64,
        InvalidDataReason::InvalidOwnerPublicKey,
    )?;

    let mut inner = Vec::new();
    inner.extend(command::counted_section(vec![command::append_string_show(
        "FIO Domain",
        data.fio_domain.as_bytes(),
        1,
        62,
    )]));
    inner.extend(command::counted_section(vec![command::append_string_show(
        "Owner Pubkey",
        data.new_owner_fio_public_key.as_bytes(),
        0,
        command::DEFAULT_MAX_LENGTH,
    )]));
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.extend(tpid_section(&data.tpid)?);

    let mut commands = action_header(action, "Transfer FIO Domain");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn set_public(
    action: &ParsedAction,
    data: &SetDomainPublicData,
) -> Result<Vec<Command>, Error> {
    let mut inner = vec![domain_field(&data.fio_domain)?];
    // is_public serializes as a bool byte and is confirmed on screen
    if data.is_public {
        inner.push(command::append_const_data(vec![0x01]));
        inner.push(command::show_message("Make", "Public"));
    } else {
        inner.push(command::append_const_data(vec![0x00]));
        inner.push(command::show_message("Make", "Private"));
    }
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, "Set FIO Domain registration permission");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_transaction;
    use crate::types::{Action, ActionAuthorization, ActionData, Transaction};
    use ledger_fio_apdu::command::CommandCode;

    fn compile(is_public: bool) -> Vec<Command> {
        let tx = Transaction {
            expiration: "2021-08-26T17:08:59".into(),
            ref_block_num: 1,
            ref_block_prefix: 2,
            context_free_actions: vec![],
            actions: vec![Action {
                account: "fio.address".into(),
                name: "setdomainpub".into(),
                authorization: vec![ActionAuthorization {
                    actor: "aftyershcu22".into(),
                    permission: "active".into(),
                }],
                data: ActionData::SetDomainPublic(SetDomainPublicData {
                    fio_domain: "wallet".into(),
                    is_public,
                    max_fee: "300000000".into(),
                    actor: "aftyershcu22".into(),
                    tpid: "rewards@wallet".into(),
                }),
            }],
        };
        let parsed = parse_transaction(&tx).unwrap();
        let data = match parsed.action.data {
            ActionData::SetDomainPublic(data) => data,
            _ => unreachable!(),
        };
        set_public(&parsed.action, data).unwrap()
    }

    #[test]
    fn visibility_flag_picks_marker_and_message() {
        let cmds = compile(true);
        assert_eq!(cmds[7].const_data, vec![0x01]);
        let show = &cmds[8];
        assert_eq!(show.command, CommandCode::ShowMessage);
        assert_eq!(&show.const_data[5..], b"\x06Public");

        let cmds = compile(false);
        assert_eq!(cmds[7].const_data, vec![0x00]);
        assert_eq!(&cmds[8].const_data[5..], b"\x07Private");
    }
}
