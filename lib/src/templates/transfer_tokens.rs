// Copyright (c) 2022-2023 The FIO Protocol

//! `fio.token::trnsfiopubky`

use ledger_fio_apdu::command::{self, Command, StorageCompare, DEFAULT_MAX_LENGTH};

use crate::{
    error::{Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::TransferTokensData,
};

use super::{action_header, actor_compare, fio_amount_show};

pub(super) fn commands(
    action: &ParsedAction,
    data: &TransferTokensData,
) -> Result<Vec<Command>, Error> {
    validate_ascii(&data.payee_public_key, 1, 64, InvalidDataReason::InvalidPublicKey)?;

    let mut inner = Vec::new();
    inner.extend(command::counted_section(vec![command::append_string_show(
        "Payee Pubkey",
        data.payee_public_key.as_bytes(),
        0,
        DEFAULT_MAX_LENGTH,
    )]));
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
    inner.push(actor_compare(&data.actor)?);
    inner.extend(command::counted_section(vec![
        command::append_string_do_not_show(
            super::tpid_checked(&data.tpid)?.as_bytes(),
            0,
            DEFAULT_MAX_LENGTH,
            StorageCompare::DoNotCompare,
        ),
    ]));

    let mut commands = action_header(action, "Transfer FIO tokens");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_transaction;
    use crate::types::{Action, ActionAuthorization, ActionData, Transaction};
    use ledger_fio_apdu::command::CommandCode;

    fn tx(amount: &str) -> Transaction {
        Transaction {
            expiration: "2021-08-26T17:08:59".into(),
            ref_block_num: 1,
            ref_block_prefix: 2,
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
                    amount: amount.into(),
                    max_fee: "800000000".into(),
                    actor: "aftyershcu22".into(),
                    tpid: "rewards@wallet".into(),
                }),
            }],
        }
    }

    #[test]
    fn field_order_and_amount_encoding() {
        let tx = tx("20000000000");
        let parsed = parse_transaction(&tx).unwrap();
        let data = match parsed.action.data {
            ActionData::TransferTokens(data) => data,
            _ => unreachable!(),
        };
        let cmds = commands(&parsed.action, data).unwrap();

        // header (5) + outer start + pubkey section (3) + amount + fee +
        // actor + tpid section (3) + outer end
        assert_eq!(cmds.len(), 5 + 1 + 3 + 3 + 3 + 1);
        assert_eq!(cmds[5].command, CommandCode::StartCountedSection);

        let amount = &cmds[9];
        assert_eq!(amount.command, CommandCode::AppendData);
        // big-endian for display
        assert_eq!(amount.var_data, 20000000000u64.to_be_bytes().to_vec());
        assert_eq!(amount.tx_len, 8);

        let actor = &cmds[11];
        assert_eq!(actor.const_data[18], 0x02 | 0x10);
        assert_eq!(cmds.last().unwrap().command, CommandCode::EndCountedSection);
    }

    #[test]
    fn rejects_malformed_amount() {
        let tx = tx("not-a-number");
        let parsed = parse_transaction(&tx).unwrap();
        let data = match parsed.action.data {
            ActionData::TransferTokens(data) => data,
            _ => unreachable!(),
        };
        assert!(matches!(
            commands(&parsed.action, data),
            Err(Error::InvalidData(InvalidDataReason::InvalidAmount))
        ));
    }
}
