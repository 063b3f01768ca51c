// Copyright (c) 2022-2023 The FIO Protocol

use ledger_fio_apdu::Instruction;

use crate::{
    error::Error,
    interaction::{ApduRequest, Interaction, Step},
    types::GetSerialResponse,
};

const SERIAL_LENGTH: usize = 7;

/// `GET_SERIAL`: single exchange, 7-byte device serial
#[derive(Default)]
pub(crate) struct GetSerial;

impl GetSerial {
    pub fn new() -> Self {
        Self
    }
}

impl Interaction for GetSerial {
    type Output = GetSerialResponse;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error> {
        match response {
            None => Ok(Step::Exchange(
                ApduRequest::new(Instruction::GetSerial, 0, 0, Vec::new())
                    .expecting(Some(SERIAL_LENGTH)),
            )),
            Some(data) => Ok(Step::Done(GetSerialResponse {
                serial_hex: hex::encode(data),
            })),
        }
    }
}
