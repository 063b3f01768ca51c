// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.address` crypto handle actions: address mappings, registration,
//! transfer

use ledger_fio_apdu::command::{self, Command};

use crate::{
    error::{validate, Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::{AddressMappingData, FioAddressOpData, RegisterAddressData, TransferAddressData},
};

use super::{action_header, actor_compare, fio_amount_show, tpid_section, tpid_with_length};

const MAX_PUBLIC_ADDRESSES: usize = 5;

fn checked_fio_address(fio_address: &str) -> Result<&str, Error> {
    validate_ascii(fio_address, 3, 64, InvalidDataReason::InvalidFioAddress)?;
    Ok(fio_address)
}

/// Shared by `addaddress` and `remaddress`; both carry 1 to 5 chain/token/
/// address mappings behind a count byte
pub(super) fn mapping(
    action: &ParsedAction,
    data: &AddressMappingData,
    label: &str,
) -> Result<Vec<Command>, Error> {
    let fio_address = checked_fio_address(&data.fio_address)?;
    validate(
        (1..=MAX_PUBLIC_ADDRESSES).contains(&data.public_addresses.len()),
        InvalidDataReason::IncorrectNumberOfPublicAddresses,
    )?;

    let mut inner = vec![command::append_string_with_length_show(
        "FIO Cr. Handle",
        fio_address.as_bytes(),
        3,
        64,
    )];
    inner.push(command::append_const_data(vec![
        data.public_addresses.len() as u8,
    ]));
    for (i, entry) in data.public_addresses.iter().enumerate() {
        validate_ascii(&entry.chain_code, 1, 10, InvalidDataReason::InvalidChainCode)?;
        validate_ascii(&entry.token_code, 1, 10, InvalidDataReason::InvalidTokenCode)?;
        validate_ascii(
            &entry.public_address,
            1,
            128,
            InvalidDataReason::InvalidPublicAddress,
        )?;
        inner.push(command::append_public_address_show(
            &format!("Mapping {}", i + 1),
            &entry.chain_code,
            &entry.token_code,
            &entry.public_address,
        ));
    }
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, label);
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn remove_all(
    action: &ParsedAction,
    data: &FioAddressOpData,
) -> Result<Vec<Command>, Error> {
    let fio_address = checked_fio_address(&data.fio_address)?;

    let mut inner = Vec::new();
    inner.extend(command::counted_section(vec![command::append_string_show(
        "FIO Crypto Handle",
        fio_address.as_bytes(),
        3,
        64,
    )]));
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.extend(tpid_section(&data.tpid)?);

    let mut commands = action_header(action, "Remove all public addresses");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn register(
    action: &ParsedAction,
    data: &RegisterAddressData,
) -> Result<Vec<Command>, Error> {
    let fio_address = checked_fio_address(&data.fio_address)?;
    validate_ascii(
        &data.owner_fio_public_key,
        1,
        64,
        InvalidDataReason::InvalidOwnerPublicKey,
    )?;

    let mut inner = vec![
        command::append_string_with_length_show("FIO Cr. Handle", fio_address.as_bytes(), 3, 64),
        command::append_string_with_length_show(
            "Owner Pubkey",
            data.owner_fio_public_key.as_bytes(),
            0,
            command::DEFAULT_MAX_LENGTH,
        ),
    ];
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, "Register FIO Crypto Handle");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn transfer(
    action: &ParsedAction,
    data: &TransferAddressData,
) -> Result<Vec<Command>, Error> {
    let fio_address = checked_fio_address(&data.fio_address)?;
    validate_ascii(
        &data.new_owner_fio_public_key,
        1,
        64,
        InvalidDataReason::InvalidOwnerPublicKey,
    )?;

    let mut inner = Vec::new();
    inner.extend(command::counted_section(vec![command::append_string_show(
        "FIO Crypto Handle",
        fio_address.as_bytes(),
        3,
        64,
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

    let mut commands = action_header(action, "Transfer FIO Crypto Handle");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_transaction;
    use crate::types::{Action, ActionAuthorization, ActionData, PublicAddress, Transaction};
    use ledger_fio_apdu::command::{CommandCode, ValueFormat};

    fn mapping_data(count: usize) -> AddressMappingData {
        AddressMappingData {
            fio_address: "someone@wallet".into(),
            public_addresses: (0..count)
                .map(|i| PublicAddress {
                    chain_code: "ETH".into(),
                    token_code: "ETH".into(),
                    public_address: format!("0x{i:040}"),
                })
                .collect(),
            max_fee: "600000000".into(),
            actor: "aftyershcu22".into(),
            tpid: "rewards@wallet".into(),
        }
    }

    fn compile(name: &str, data: AddressMappingData) -> Result<Vec<Command>, Error> {
        let payload = if name == "addaddress" {
            ActionData::AddAddress(data)
        } else {
            ActionData::RemoveAddress(data)
        };
        let tx = Transaction {
            expiration: "2021-08-26T17:08:59".into(),
            ref_block_num: 1,
            ref_block_prefix: 2,
            context_free_actions: vec![],
            actions: vec![Action {
                account: "fio.address".into(),
                name: name.into(),
                authorization: vec![ActionAuthorization {
                    actor: "aftyershcu22".into(),
                    permission: "active".into(),
                }],
                data: payload,
            }],
        };
        let parsed = parse_transaction(&tx).unwrap();
        match parsed.action.data {
            ActionData::AddAddress(data) => mapping(&parsed.action, data, "Add public address mappings"),
            ActionData::RemoveAddress(data) => {
                mapping(&parsed.action, data, "Remove public address mappings")
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn mapping_count_byte_precedes_entries() {
        let cmds = compile("remaddress", mapping_data(2)).unwrap();

        // handle, count marker, two mapping entries
        let handle = &cmds[6];
        assert_eq!(
            handle.const_data[0],
            u8::from(ValueFormat::AsciiStringWithLength)
        );

        let count = &cmds[7];
        assert_eq!(count.command, CommandCode::AppendConstData);
        assert_eq!(count.const_data, vec![2u8]);

        let entry = &cmds[8];
        assert_eq!(
            entry.const_data[0],
            u8::from(ValueFormat::ChainCodeTokenCodePublicAddr)
        );
        // three length-prefixed strings
        assert_eq!(entry.var_data[0] as usize, 3);
    }

    #[test]
    fn mapping_count_limits() {
        assert!(compile("addaddress", mapping_data(1)).is_ok());
        assert!(compile("addaddress", mapping_data(5)).is_ok());
        for bad in [0, 6] {
            assert!(matches!(
                compile("addaddress", mapping_data(bad)),
                Err(Error::InvalidData(
                    InvalidDataReason::IncorrectNumberOfPublicAddresses
                ))
            ));
        }
    }
}
