// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.reqobt::newfundsreq`
//!
//! The request details (payee address, amount, token, memo or hash) travel
//! through a DH encryption sub-stream keyed to the payee's public key; only
//! the ciphertext length is accounted in the surrounding counted section.

use ledger_fio_apdu::command::{self, Command, DEFAULT_MAX_LENGTH};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{parse_dh_public_key, parse_uint64_str, validate_ascii, ParsedAction},
    types::RequestFundsData,
};

use super::{action_header, actor_decode_name_section, fio_amount_show, memo_and_hash, tpid_section};

// Ciphertext bounds enforced by the device for the encrypted request content
const DH_SECTION_MIN: u64 = 64;
const DH_SECTION_MAX: u64 = 296;

pub(super) fn commands(
    action: &ParsedAction,
    data: &RequestFundsData,
) -> Result<Vec<Command>, Error> {
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
        &data.payee_public_address,
        1,
        128,
        InvalidDataReason::InvalidPublicAddress,
    )?;
    parse_uint64_str(&data.amount, InvalidDataReason::InvalidAmount)?;
    validate_ascii(&data.chain_code, 1, 10, InvalidDataReason::InvalidChainCode)?;
    validate_ascii(&data.token_code, 1, 10, InvalidDataReason::InvalidTokenCode)?;
    let peer_public_key = parse_dh_public_key(&data.payee_public_key)?;

    let mut encrypted = Vec::new();
    encrypted.extend(command::counted_section(vec![command::append_string_show(
        "Payee Public Addr.",
        data.payee_public_address.as_bytes(),
        0,
        DEFAULT_MAX_LENGTH,
    )]));
    encrypted.extend(command::counted_section(vec![command::append_string_show(
        "Amount requested",
        data.amount.as_bytes(),
        0,
        DEFAULT_MAX_LENGTH,
    )]));
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
    encrypted.extend(memo_and_hash(&data.memo, &data.hash, &data.offline_url)?);

    let mut inner = Vec::new();
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

    let mut commands = action_header(action, "Request Funds");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_transaction;
    use crate::types::{Action, ActionAuthorization, ActionData, Transaction};
    use ledger_fio_apdu::command::{dh_encrypted_len, stream_tx_len, CommandCode, DataAction};

    fn request_data() -> RequestFundsData {
        RequestFundsData {
            payer_fio_address: "payer@wallet".into(),
            payee_fio_address: "payee@wallet".into(),
            payee_public_key: format!("04{}", "ab".repeat(64)),
            payee_public_address: "bc1qabc".into(),
            amount: "12345".into(),
            chain_code: "BTC".into(),
            token_code: "BTC".into(),
            memo: Some("payment".into()),
            hash: None,
            offline_url: None,
            max_fee: "4000000000".into(),
            actor: "aftyershcu22".into(),
            tpid: "rewards@wallet".into(),
        }
    }

    fn tx(data: RequestFundsData) -> Transaction {
        Transaction {
            expiration: "2021-08-26T17:08:59".into(),
            ref_block_num: 1,
            ref_block_prefix: 2,
            context_free_actions: vec![],
            actions: vec![Action {
                account: "fio.reqobt".into(),
                name: "newfundsreq".into(),
                authorization: vec![ActionAuthorization {
                    actor: "aftyershcu22".into(),
                    permission: "active".into(),
                }],
                data: ActionData::RequestFunds(data),
            }],
        }
    }

    fn compile(data: RequestFundsData) -> Result<Vec<Command>, Error> {
        let tx = tx(data);
        let parsed = parse_transaction(&tx).unwrap();
        let data = match parsed.action.data {
            ActionData::RequestFunds(data) => data,
            _ => unreachable!(),
        };
        commands(&parsed.action, data)
    }

    #[test]
    fn dh_section_carries_peer_key_and_expanded_length() {
        let cmds = compile(request_data()).unwrap();

        let dh_start = cmds
            .iter()
            .find(|c| c.command == CommandCode::StartDhEncryption)
            .unwrap();
        assert_eq!(dh_start.var_data.len(), 65);
        assert_eq!(dh_start.data_action, DataAction::AppendDhPayload);

        // every command between DH start and end streams ciphertext back
        let start = cmds
            .iter()
            .position(|c| c.command == CommandCode::StartDhEncryption)
            .unwrap();
        let end = cmds
            .iter()
            .position(|c| c.command == CommandCode::EndDhEncryption)
            .unwrap();
        assert!(start < end);
        for c in &cmds[start..=end] {
            assert_eq!(c.data_action, DataAction::AppendDhPayload);
            assert_eq!(c.expected_response_len, None);
        }

        // the wrapped commands no longer contribute raw bytes; the section
        // start accounts the ciphertext
        let wrapped: usize = cmds[start + 1..end].iter().map(|c| c.tx_len).sum();
        assert_eq!(wrapped, 0);
        assert!(dh_start.tx_len >= dh_encrypted_len(0));

        // enclosing counted section sees only varint prefix + ciphertext
        assert!(stream_tx_len(&cmds) > 0);
    }

    #[test]
    fn rejects_compressed_payee_key() {
        let mut data = request_data();
        data.payee_public_key = format!("02{}", "ab".repeat(32));
        assert!(matches!(
            compile(data),
            Err(Error::InvalidData(InvalidDataReason::InvalidPublicKey))
        ));
    }

    #[test]
    fn rejects_memo_hash_conflicts() {
        let mut data = request_data();
        data.hash = Some("deadbeef".into());
        assert!(matches!(
            compile(data),
            Err(Error::InvalidData(InvalidDataReason::InvalidHash))
        ));

        let mut data = request_data();
        data.memo = None;
        assert!(matches!(
            compile(data),
            Err(Error::InvalidData(InvalidDataReason::InvalidMemo))
        ));
    }

    #[test]
    fn rejects_bad_chain_code() {
        let mut data = request_data();
        data.chain_code = "TOOLONGCHAIN".into();
        assert!(matches!(
            compile(data),
            Err(Error::InvalidData(InvalidDataReason::InvalidChainCode))
        ));
    }
}
