// Copyright (c) 2022-2023 The FIO Protocol

//! `eosio::voteproducer`

use ledger_fio_apdu::command::{self, Command};

use crate::{
    error::{validate, Error, InvalidDataReason},
    parse::{validate_ascii, ParsedAction},
    types::VoteProducerData,
};

use super::{action_header, actor_compare, fio_amount_show};

/// The device whitelists a per-count sequence variant for each list size
const MAX_PRODUCERS: usize = 30;

pub(super) fn commands(
    action: &ParsedAction,
    data: &VoteProducerData,
) -> Result<Vec<Command>, Error> {
    validate(
        !data.producers.is_empty() && data.producers.len() <= MAX_PRODUCERS,
        InvalidDataReason::IncorrectNumberOfProducers,
    )?;
    validate_ascii(&data.fio_address, 3, 64, InvalidDataReason::InvalidFioAddress)?;

    let mut inner = vec![command::append_const_data(vec![data.producers.len() as u8])];
    for (i, producer) in data.producers.iter().enumerate() {
        validate_ascii(producer, 3, 64, InvalidDataReason::InvalidProducer)?;
        inner.push(command::append_string_with_length_show(
            &format!("Producer {}", i + 1),
            producer.as_bytes(),
            3,
            64,
        ));
    }
    inner.push(command::append_string_with_length_show(
        "FIO Cr. Handle",
        data.fio_address.as_bytes(),
        3,
        64,
    ));
    inner.push(actor_compare(&data.actor)?);
    inner.push(fio_amount_show(
        "Max fee",
        &data.max_fee,
        InvalidDataReason::InvalidMaxFee,
    )?);

    let mut commands = action_header(action, "Vote for FIO Block producers");
    commands.extend(command::counted_section(inner));
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_transaction;
    use crate::types::{Action, ActionAuthorization, ActionData, Transaction};
    use ledger_fio_apdu::command::{CommandCode, ValueFormat};

    fn compile(producers: Vec<String>) -> Result<Vec<Command>, Error> {
        let tx = Transaction {
            expiration: "2021-08-26T17:08:59".into(),
            ref_block_num: 1,
            ref_block_prefix: 2,
            context_free_actions: vec![],
            actions: vec![Action {
                account: "eosio".into(),
                name: "voteproducer".into(),
                authorization: vec![ActionAuthorization {
                    actor: "aftyershcu22".into(),
                    permission: "active".into(),
                }],
                data: ActionData::VoteProducer(VoteProducerData {
                    producers,
                    fio_address: "someone@wallet".into(),
                    actor: "aftyershcu22".into(),
                    max_fee: "600000000".into(),
                }),
            }],
        };
        let parsed = parse_transaction(&tx).unwrap();
        let data = match parsed.action.data {
            ActionData::VoteProducer(data) => data,
            _ => unreachable!(),
        };
        commands(&parsed.action, data)
    }

    #[test]
    fn producers_are_counted_and_labeled() {
        let cmds = compile(vec!["bp1@dapix".into(), "bp2@dapix".into()]).unwrap();

        let count = &cmds[6];
        assert_eq!(count.command, CommandCode::AppendConstData);
        assert_eq!(count.const_data, vec![2u8]);

        let first = &cmds[7];
        assert_eq!(
            first.const_data[0],
            u8::from(ValueFormat::AsciiStringWithLength)
        );
        assert_eq!(&first.const_data[20..], b"Producer 1");
        assert_eq!(&cmds[8].const_data[20..], b"Producer 2");
    }

    #[test]
    fn fee_serializes_last() {
        let cmds = compile(vec!["bp1@dapix".into()]).unwrap();
        let fee = &cmds[cmds.len() - 2];
        assert_eq!(fee.const_data[0], u8::from(ValueFormat::FioAmount));
        assert_eq!(&fee.const_data[20..], b"Max fee");
    }

    #[test]
    fn empty_producer_list_is_rejected() {
        assert!(matches!(
            compile(vec![]),
            Err(Error::InvalidData(
                InvalidDataReason::IncorrectNumberOfProducers
            ))
        ));
    }

    #[test]
    fn producer_list_is_capped_at_thirty() {
        let producers = |n: usize| (0..n).map(|i| format!("bp{i}@dapix")).collect::<Vec<_>>();

        assert!(compile(producers(30)).is_ok());
        assert!(matches!(
            compile(producers(31)),
            Err(Error::InvalidData(
                InvalidDataReason::IncorrectNumberOfProducers
            ))
        ));
    }
}
