// Copyright (c) 2022-2023 The FIO Protocol

//! Transaction templates
//!
//! Each supported action compiles to a fixed sequence of signing commands;
//! the device whitelists these sequences, so field order, display labels and
//! validation bounds are part of the device contract and must not drift.
//!
//! All templates share the same shape: an action header (packed contract
//! account and name, an action label for the screen, the authorization actor
//! stored for later comparison), then one counted section holding the
//! action's serialized fields.

use ledger_fio_apdu::{
    command::{self, Command, StorageCompare},
    path::Bip32Path,
    serialize::uint64_to_buf,
};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{
        parse_name, parse_transaction, parse_uint64_str, validate_ascii, parse_chain_id,
        ParsedAction,
    },
    types::{ActionData, Transaction},
};

mod address;
mod domain;
mod funds_request_ops;
mod nft;
mod record_obt;
mod request_funds;
mod staking;
mod transfer_tokens;
mod voting;

/// Register holding the authorization actor for in-stream comparisons
const ACTOR_REGISTER: u8 = 1;

// Transaction header marker: max_net_usage_words, max_cpu_usage_ms,
// delay_sec, a zero context-free action count and an action count of one
const ACTION_COUNT_MARKER: [u8; 5] = [0x00, 0x00, 0x00, 0x00, 0x01];

// Trailer: empty transaction_extensions plus the 32-byte zero
// context_free_data digest
const TRANSACTION_TRAILER: [u8; 33] = [0u8; 33];

/// Compile a transaction into the full signing command stream
pub(crate) fn compile(
    chain_id: &str,
    tx: &Transaction,
    path: &Bip32Path,
) -> Result<Vec<Command>, Error> {
    let chain_id = parse_chain_id(chain_id)?;
    let parsed = parse_transaction(tx)?;
    let action = &parsed.action;

    let body = match action.data {
        ActionData::TransferTokens(data) => transfer_tokens::commands(action, data)?,
        ActionData::RequestFunds(data) => request_funds::commands(action, data)?,
        ActionData::RecordObt(data) => record_obt::commands(action, data)?,
        ActionData::RejectFundsRequest(data) => funds_request_ops::reject(action, data)?,
        ActionData::CancelFundsRequest(data) => funds_request_ops::cancel(action, data)?,
        ActionData::AddAddress(data) => {
            address::mapping(action, data, "Add public address mappings")?
        }
        ActionData::RemoveAddress(data) => {
            address::mapping(action, data, "Remove public address mappings")?
        }
        ActionData::RemoveAllAddresses(data) => address::remove_all(action, data)?,
        ActionData::AddNft(data) => nft::add(action, data)?,
        ActionData::RemoveAllNfts(data) => nft::remove_all(action, data)?,
        ActionData::RegisterAddress(data) => address::register(action, data)?,
        ActionData::TransferAddress(data) => address::transfer(action, data)?,
        ActionData::RegisterDomain(data) => domain::register(action, data)?,
        ActionData::RenewDomain(data) => domain::renew(action, data)?,
        ActionData::TransferDomain(data) => domain::transfer(action, data)?,
        ActionData::SetDomainPublic(data) => domain::set_public(action, data)?,
        ActionData::Stake(data) => staking::commands(action, data, "Stake FIO Tokens")?,
        ActionData::Unstake(data) => staking::commands(action, data, "Unstake FIO Tokens")?,
        ActionData::VoteProducer(data) => voting::commands(action, data)?,
    };

    // Header fields are appended reversed so the device renders the most
    // significant byte first
    let mut header = Vec::with_capacity(10);
    header.extend(parsed.expiration.iter().rev());
    header.extend(parsed.ref_block_num.iter().rev());
    header.extend(parsed.ref_block_prefix.iter().rev());

    let mut commands = vec![
        command::init(&chain_id, path),
        command::append_buffer_do_not_show(header, 10, 10, StorageCompare::DoNotCompare),
        command::append_const_data(ACTION_COUNT_MARKER.to_vec()),
    ];
    commands.extend(body);
    commands.push(command::append_const_data(TRANSACTION_TRAILER.to_vec()));
    commands.push(command::finish(path));
    Ok(commands)
}

/// Common action prelude: packed contract pair, action label, actor stored
/// into the compare register and the authorization appended
fn action_header(action: &ParsedAction, label: &str) -> Vec<Command> {
    let mut contract = Vec::with_capacity(17);
    contract.extend_from_slice(action.account.as_bytes());
    contract.extend_from_slice(action.name.as_bytes());
    contract.push(0x01);

    vec![
        command::append_const_data(contract),
        command::show_message("Action", label),
        command::store_value(ACTOR_REGISTER, action.actor.as_bytes()),
        command::append_buffer_do_not_show(
            action.actor.as_bytes().to_vec(),
            8,
            8,
            StorageCompare::Register1,
        ),
        command::append_buffer_do_not_show(
            action.permission.as_bytes().to_vec(),
            8,
            8,
            StorageCompare::DoNotCompare,
        ),
    ]
}

/// Parse a decimal amount and append it big-endian for display
fn fio_amount_show(key: &str, value: &str, reason: InvalidDataReason) -> Result<Command, Error> {
    let amount = parse_uint64_str(value, reason)?;
    let mut buf = uint64_to_buf(amount);
    buf.reverse();
    Ok(command::append_fio_amount_show(key, buf.to_vec()))
}

/// Append the action data actor packed as a name, compared against the
/// stored authorization actor
fn actor_compare(actor: &str) -> Result<Command, Error> {
    let actor = parse_name(actor, InvalidDataReason::InvalidActor)?;
    Ok(command::append_buffer_do_not_show(
        actor.as_bytes().to_vec(),
        8,
        8,
        StorageCompare::Register1,
    ))
}

/// Actor as a chain-serialized string field; the device decodes it as a name
/// and compares against the stored authorization actor
fn actor_decode_name_section(actor: &str) -> Result<Vec<Command>, Error> {
    validate_ascii(actor, 0, 14, InvalidDataReason::InvalidActor)?;
    Ok(command::counted_section(vec![
        command::append_string_do_not_show(
            actor.as_bytes(),
            0,
            14,
            StorageCompare::Register1DecodeName,
        ),
    ]))
}

fn tpid_checked(tpid: &str) -> Result<&str, Error> {
    validate_ascii(tpid, 0, 20, InvalidDataReason::InvalidTpid)?;
    Ok(tpid)
}

/// TPID inside its own counted section with device-side length bounds
fn tpid_section(tpid: &str) -> Result<Vec<Command>, Error> {
    let tpid = tpid_checked(tpid)?;
    Ok(command::counted_section(vec![
        command::append_string_do_not_show(tpid.as_bytes(), 0, 21, StorageCompare::DoNotCompare),
    ]))
}

/// TPID as a single length-prefixed string field
fn tpid_with_length(tpid: &str) -> Result<Command, Error> {
    let tpid = tpid_checked(tpid)?;
    Ok(command::append_string_with_length_do_not_show(
        tpid.as_bytes(),
        0,
        command::DEFAULT_MAX_LENGTH,
    ))
}

/// Memo / hash alternative shared by the OBT request templates
///
/// A request carries either a memo, or a hash plus an offline url; the two
/// alternatives serialize with different option markers.
fn memo_and_hash(
    memo: &Option<String>,
    hash: &Option<String>,
    offline_url: &Option<String>,
) -> Result<Vec<Command>, Error> {
    match (memo, hash, offline_url) {
        (Some(memo), None, None) => {
            validate_ascii(memo, 0, 255, InvalidDataReason::InvalidMemo)?;
            let mut commands = vec![command::append_const_data(vec![0x01])];
            commands.extend(command::counted_section(vec![command::append_string_show(
                "Memo",
                memo.as_bytes(),
                0,
                command::DEFAULT_MAX_LENGTH,
            )]));
            commands.push(command::append_const_data(vec![0x00, 0x00]));
            Ok(commands)
        }
        (None, Some(hash), Some(offline_url)) => {
            validate_ascii(hash, 0, 255, InvalidDataReason::InvalidHash)?;
            validate_ascii(offline_url, 0, 255, InvalidDataReason::InvalidOfflineUrl)?;
            let mut commands = vec![command::append_const_data(vec![0x00, 0x01])];
            commands.extend(command::counted_section(vec![command::append_string_show(
                "Hash",
                hash.as_bytes(),
                0,
                command::DEFAULT_MAX_LENGTH,
            )]));
            commands.push(command::append_const_data(vec![0x01]));
            commands.extend(command::counted_section(vec![command::append_string_show(
                "Offline url",
                offline_url.as_bytes(),
                0,
                command::DEFAULT_MAX_LENGTH,
            )]));
            Ok(commands)
        }
        (Some(_), Some(_), _) => Err(InvalidDataReason::InvalidHash.into()),
        (Some(_), None, Some(_)) => Err(InvalidDataReason::InvalidOfflineUrl.into()),
        _ => Err(InvalidDataReason::InvalidMemo.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, ActionAuthorization, TransferTokensData};
    use ledger_fio_apdu::command::CommandCode;

    fn path() -> Bip32Path {
        Bip32Path::try_from(&[0x8000002c, 0x800000eb, 0x80000000, 0, 0][..]).unwrap()
    }

    fn chain_id() -> String {
        "4e46572250454b796d7296eec9e8896327ea82dd40f2cd74cf1b1d8ba90bcd77".to_string()
    }

    fn transfer_tx() -> Transaction {
        Transaction {
            expiration: "2021-08-28T12:50:36.686".into(),
            ref_block_num: 0x1234,
            ref_block_prefix: 0x56789abc,
            context_free_actions: vec![],
            actions: vec![Action {
                account: "fio.token".into(),
                name: "trnsfiopubky".into(),
                authorization: vec![ActionAuthorization {
                    actor: "aftyershcu22".into(),
                    permission: "active".into(),
                }],
                data: ActionData::TransferTokens(TransferTokensData {
                    payee_public_key: "FIO5kJKNHwctcfUM5XZyiWSqSTM5HTzznJP9F3ZdbhaQAHEVq575o"
                        .into(),
                    amount: "20000000000".into(),
                    max_fee: "287454020".into(),
                    actor: "aftyershcu22".into(),
                    tpid: "rewards@wallet".into(),
                }),
            }],
        }
    }

    #[test]
    fn envelope_structure() {
        let tx = transfer_tx();
        let commands = compile(&chain_id(), &tx, &path()).unwrap();

        assert_eq!(commands[0].command, CommandCode::Init);
        assert_eq!(commands[0].var_data.len(), 32 + 21);

        // tx header: reversed expiration, ref block num, ref block prefix
        assert_eq!(commands[1].command, CommandCode::AppendData);
        assert_eq!(
            commands[1].var_data,
            vec![0x61, 0x2a, 0x31, 0x1c, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]
        );

        assert_eq!(commands[2].command, CommandCode::AppendConstData);
        assert_eq!(commands[2].const_data, ACTION_COUNT_MARKER.to_vec());

        let trailer = &commands[commands.len() - 2];
        assert_eq!(trailer.command, CommandCode::AppendConstData);
        assert_eq!(trailer.const_data, vec![0u8; 33]);

        let finish = commands.last().unwrap();
        assert_eq!(finish.command, CommandCode::Finish);
        assert_eq!(finish.expected_response_len, Some(97));
    }

    #[test]
    fn action_header_stores_and_compares_actor() {
        let tx = transfer_tx();
        let commands = compile(&chain_id(), &tx, &path()).unwrap();

        // packed account + name + action count
        let contract = &commands[3];
        assert_eq!(contract.command, CommandCode::AppendConstData);
        assert_eq!(
            hex::encode(&contract.const_data),
            "0000980ad20ca85be0e1d195ba85e7cd01"
        );

        assert_eq!(commands[4].command, CommandCode::ShowMessage);

        let store = &commands[5];
        assert_eq!(store.command, CommandCode::StoreValue);
        assert_eq!(store.p2, ACTOR_REGISTER);
        assert_eq!(hex::encode(&store.var_data), "2084460d5fe5f332");

        // actor compared against register 1, permission not compared
        assert_eq!(commands[6].const_data[18], 0x02 | 0x10);
        assert_eq!(commands[7].const_data[18], 0x02);
        assert_eq!(hex::encode(&commands[7].var_data), "00000000a8ed3232");
    }

    #[test]
    fn memo_and_hash_are_mutually_exclusive() {
        assert!(memo_and_hash(&Some("memo".into()), &None, &None).is_ok());
        assert!(memo_and_hash(&None, &Some("h".into()), &Some("u".into())).is_ok());

        assert!(matches!(
            memo_and_hash(&Some("m".into()), &Some("h".into()), &None),
            Err(Error::InvalidData(InvalidDataReason::InvalidHash))
        ));
        // hash without offline url does not form a valid alternative
        assert!(matches!(
            memo_and_hash(&None, &Some("h".into()), &None),
            Err(Error::InvalidData(InvalidDataReason::InvalidMemo))
        ));
        assert!(matches!(
            memo_and_hash(&None, &None, &None),
            Err(Error::InvalidData(InvalidDataReason::InvalidMemo))
        ));
    }
}
