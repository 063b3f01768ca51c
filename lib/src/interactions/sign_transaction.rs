// Copyright (c) 2022-2023 The FIO Protocol

use ledger_fio_apdu::{
    command::{Command, DataAction, SignAccumulator},
    path::Bip32Path,
    Instruction,
};

use crate::{
    error::Error,
    interaction::{ApduRequest, Interaction, Step},
    types::{SignedTransactionData, Witness},
};

/// `SIGN_TX`: replay a compiled command stream, folding each response into
/// the accumulator
///
/// The stream is produced by the transaction templates; this interaction is
/// a pure executor and does not inspect command semantics beyond the fold
/// each command requests for its response.
pub(crate) struct SignTransaction {
    commands: std::vec::IntoIter<Command>,
    pending: Option<DataAction>,
    acc: SignAccumulator,
    path: Bip32Path,
}

impl SignTransaction {
    pub fn new(commands: Vec<Command>, path: Bip32Path) -> Self {
        Self {
            commands: commands.into_iter(),
            pending: None,
            acc: SignAccumulator::default(),
            path,
        }
    }
}

impl Interaction for SignTransaction {
    type Output = SignedTransactionData;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error> {
        if let Some(action) = self.pending.take() {
            let response = response.unwrap_or_default();
            self.acc = action.fold(&response, std::mem::take(&mut self.acc))?;
        }

        match self.commands.next() {
            Some(command) => {
                let payload = command.payload()?;
                self.pending = Some(command.data_action);
                let req =
                    ApduRequest::new(Instruction::SignTx, command.command.into(), command.p2, payload)
                        .expecting(command.expected_response_len);
                Ok(Step::Exchange(req))
            }
            None => {
                let SignAccumulator {
                    dh_encrypted_data,
                    tx_hash_hex,
                    witness_signature_hex,
                } = std::mem::take(&mut self.acc);

                match (tx_hash_hex, witness_signature_hex) {
                    (Some(tx_hash_hex), Some(witness_signature_hex)) => {
                        Ok(Step::Done(SignedTransactionData {
                            tx_hash_hex,
                            witness: Witness {
                                path: self.path.clone(),
                                witness_signature_hex,
                            },
                            dh_encrypted_data,
                        }))
                    }
                    _ => Err(Error::IncompleteSigningStream),
                }
            }
        }
    }
}
