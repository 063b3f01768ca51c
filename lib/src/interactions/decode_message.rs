// Copyright (c) 2022-2023 The FIO Protocol

use ledger_fio_apdu::{
    path::Bip32Path,
    serialize::{buf_to_uint16, chunk_by},
    status::StatusCode,
    Instruction,
};

use crate::{
    error::Error,
    interaction::{ApduRequest, Interaction, Step},
    types::{DecodeContext, DecodeMessageResponse},
};

const P1_SEND_DATA: u8 = 0x01;
const P1_DECODE: u8 = 0x02;
const P1_RECEIVE_REST: u8 = 0x03;

const FIRST_CHUNK_LENGTH: usize = 200;

enum State {
    Start,
    SentFirst,
    SentAll,
    Decoding,
    Receiving,
}

/// `DECODE_MESSAGE`: upload an encrypted payload, have the device decrypt it
/// with the DH secret for (path, counterparty key), then drain the plaintext
///
/// The plaintext comes back in chunks of `[totalLen u16le][chunkLen u8][bytes]`;
/// the total must repeat unchanged in every chunk and the chunk lengths must
/// add up to it exactly.
pub(crate) struct DecodeMessage {
    message: Vec<u8>,
    peer_public_key: Vec<u8>,
    path: Bip32Path,
    context: DecodeContext,

    state: State,
    decoded: Vec<u8>,
    total_len: usize,
    received: usize,
}

impl DecodeMessage {
    pub fn new(
        message: Vec<u8>,
        peer_public_key: Vec<u8>,
        path: Bip32Path,
        context: DecodeContext,
    ) -> Self {
        Self {
            message,
            peer_public_key,
            path,
            context,
            state: State::Start,
            decoded: Vec::new(),
            total_len: 0,
            received: 0,
        }
    }

    fn send_data(&self, data: Vec<u8>) -> ApduRequest {
        ApduRequest::new(Instruction::DecodeMessage, P1_SEND_DATA, 0, data).expecting(Some(0))
    }

    fn decode(&self) -> ApduRequest {
        let mut data = Vec::with_capacity(self.peer_public_key.len() + 21);
        data.extend_from_slice(&self.peer_public_key);
        data.extend_from_slice(&self.path.to_buf());
        ApduRequest::new(Instruction::DecodeMessage, P1_DECODE, self.context as u8, data)
            .expecting(None)
    }

    fn receive_rest(&self) -> ApduRequest {
        ApduRequest::new(Instruction::DecodeMessage, P1_RECEIVE_REST, 0, Vec::new())
            .expecting(None)
    }
}

impl Interaction for DecodeMessage {
    type Output = DecodeMessageResponse;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error> {
        match self.state {
            State::Start => {
                let first = self
                    .message
                    .get(..FIRST_CHUNK_LENGTH)
                    .unwrap_or(&self.message)
                    .to_vec();
                self.state = if self.message.len() > FIRST_CHUNK_LENGTH {
                    State::SentFirst
                } else {
                    State::SentAll
                };
                Ok(Step::Exchange(self.send_data(first)))
            }
            State::SentFirst => {
                let rest = self.message[FIRST_CHUNK_LENGTH..].to_vec();
                self.state = State::SentAll;
                Ok(Step::Exchange(self.send_data(rest)))
            }
            State::SentAll => {
                self.state = State::Decoding;
                Ok(Step::Exchange(self.decode()))
            }
            State::Decoding => {
                self.state = State::Receiving;
                Ok(Step::Exchange(self.receive_rest()))
            }
            State::Receiving => {
                let response = response.unwrap_or_default();
                let (header, chunk) = chunk_by(&response, &[2, 1])?;
                let total = buf_to_uint16(&[header[0][0], header[0][1]]) as usize;
                let chunk_len = header[1][0] as usize;

                if self.received == 0 {
                    self.total_len = total;
                } else if total != self.total_len {
                    return Err(Error::DeviceStatus(StatusCode::ERR_INVALID_STATE));
                }

                self.received += chunk_len;
                self.decoded.extend_from_slice(chunk);

                if self.received < self.total_len {
                    return Ok(Step::Exchange(self.receive_rest()));
                }
                if self.received != self.total_len || self.decoded.len() != self.total_len {
                    return Err(Error::DeviceStatus(StatusCode::ERR_INVALID_STATE));
                }
                Ok(Step::Done(DecodeMessageResponse {
                    message: std::mem::take(&mut self.decoded),
                }))
            }
        }
    }
}
