// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.address::addnft` and `fio.address::remallnfts`

use ledger_fio_apdu::command::{self, Command};

use crate::{
    error::{validate, Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::{FioAddressOpData, NftMappingData},
};

use super::{action_header, actor_compare, fio_amount_show, tpid_section, tpid_with_length};

const MAX_NFTS: usize = 3;

pub(super) fn add(action: &ParsedAction, data: &NftMappingData) -> Result<Vec<Command>, Error> {
    validate_ascii(&data.fio_address, 3, 64, InvalidDataReason::InvalidFioAddress)?;
    validate(
        (1..=MAX_NFTS).contains(&data.nfts.len()),
        InvalidDataReason::IncorrectNumberOfNfts,
    )?;

    let mut inner = vec![command::append_string_with_length_show(
        "FIO Cr. Handle",
        data.fio_address.as_bytes(),
        3,
        64,
    )];
    inner.push(command::append_const_data(vec![data.nfts.len() as u8]));
    for (i, nft) in data.nfts.iter().enumerate() {
        validate_ascii(&nft.chain_code, 1, 10, InvalidDataReason::InvalidChainCode)?;
        validate_ascii(
            &nft.contract_address,
            1,
            128,
            InvalidDataReason::InvalidContractAddress,
        )?;
        validate_ascii(&nft.token_id, 0, 64, InvalidDataReason::InvalidTokenId)?;
        validate_ascii(&nft.url, 0, 128, InvalidDataReason::InvalidUrl)?;
        validate_ascii(&nft.hash, 1, 64, InvalidDataReason::InvalidNftHash)?;
        validate_ascii(&nft.metadata, 0, 128, InvalidDataReason::InvalidMetadata)?;

        inner.push(command::append_nft_show(
            &format!("Mapping {}", i + 1),
            &nft.chain_code,
            &nft.contract_address,
            &nft.token_id,
        ));
        inner.push(command::append_string_with_length_do_not_show(
            nft.url.as_bytes(),
            0,
            128,
        ));
        inner.push(command::append_string_with_length_do_not_show(
            nft.hash.as_bytes(),
            1,
            64,
        ));
        inner.push(command::append_string_with_length_do_not_show(
            nft.metadata.as_bytes(),
            0,
            128,
        ));
    }
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);
    inner.push(actor_compare(&data.actor)?);
    inner.push(tpid_with_length(&data.tpid)?);

    let mut commands = action_header(action, "Map nfts");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

pub(super) fn remove_all(
    action: &ParsedAction,
    data: &FioAddressOpData,
) -> Result<Vec<Command>, Error> {
    validate_ascii(&data.fio_address, 3, 64, InvalidDataReason::InvalidFioAddress)?;

    let mut inner = Vec::new();
    inner.extend(command::counted_section(vec![command::append_string_show(
        "FIO Crypto Handle",
        data.fio_address.as_bytes(),
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

    let mut commands = action_header(action, "Remove nft mappings");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}
