// Copyright (c) 2022-2023 The FIO Protocol

//! Step-function interaction engine
//!
//! Every device operation is an [`Interaction`]: a state machine that, fed
//! the previous response, yields either the next APDU to exchange or the
//! finished output. The [`interact`] driver owns the transport loop, status
//! word handling and response length enforcement, so interactions stay pure
//! and unit-testable without a device.

use ledger_apdu::APDUCommand;
use ledger_transport::Exchange;
use log::debug;

use ledger_fio_apdu::{status::StatusCode, Instruction, ProtocolError, FIO_APDU_CLA};

use crate::{
    error::Error,
    interactions::GetVersion,
    types::{DeviceCompatibility, Version},
};

/// Minimum app version recommended when the connected one is unsupported
pub const RECOMMENDED_VERSION: &str = "0.0.5";

/// One APDU to send, with the response length the driver should enforce
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApduRequest {
    pub ins: Instruction,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
    /// `None` leaves the length to the interaction to interpret
    pub expected_response_len: Option<usize>,
}

impl ApduRequest {
    pub fn new(ins: Instruction, p1: u8, p2: u8, data: Vec<u8>) -> Self {
        Self {
            ins,
            p1,
            p2,
            data,
            expected_response_len: Some(0),
        }
    }

    pub fn expecting(mut self, len: Option<usize>) -> Self {
        self.expected_response_len = len;
        self
    }

    fn command(&self) -> APDUCommand<Vec<u8>> {
        APDUCommand {
            cla: FIO_APDU_CLA,
            ins: self.ins.into(),
            p1: self.p1,
            p2: self.p2,
            data: self.data.clone(),
        }
    }
}

/// Outcome of one interaction step
#[derive(Clone, Debug, PartialEq)]
pub enum Step<T> {
    Exchange(ApduRequest),
    Done(T),
}

/// A device operation as an explicit step function
///
/// `step(None)` starts the interaction; subsequent calls receive the data
/// bytes of the previous exchange. Implementations must not assume they run
/// against a live device.
pub trait Interaction {
    type Output;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error>;
}

/// Compatibility window: the host speaks the 0.x protocol
pub fn get_compatibility(version: &Version) -> DeviceCompatibility {
    let is_compatible = version.major == 0;
    DeviceCompatibility {
        is_compatible,
        recommended_version: (!is_compatible).then_some(RECOMMENDED_VERSION),
    }
}

pub(crate) fn ensure_version_compatible(version: &Version) -> Result<(), Error> {
    if get_compatibility(version).is_compatible {
        Ok(())
    } else {
        Err(Error::UnsupportedVersion(*version))
    }
}

/// Runs a version exchange first and gates the wrapped interaction on the
/// result
pub(crate) struct WithVersionCheck<I> {
    version: GetVersion,
    inner: I,
    checked: bool,
}

impl<I> WithVersionCheck<I> {
    pub fn new(inner: I) -> Self {
        Self {
            version: GetVersion::new(),
            inner,
            checked: false,
        }
    }
}

impl<I: Interaction> Interaction for WithVersionCheck<I> {
    type Output = I::Output;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error> {
        if !self.checked {
            return match self.version.step(response)? {
                Step::Exchange(req) => Ok(Step::Exchange(req)),
                Step::Done(resp) => {
                    ensure_version_compatible(&resp.version)?;
                    self.checked = true;
                    self.inner.step(None)
                }
            };
        }
        self.inner.step(response)
    }
}

/// Drive an interaction to completion over the given transport
///
/// The first APDU is retried once when the device answers "still in call":
/// an aborted session can leave the app mid-operation, and the first command
/// of the next operation resets it.
pub(crate) async fn interact<T, I>(transport: &T, mut interaction: I) -> Result<I::Output, Error>
where
    T: Exchange + Send + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
    I: Interaction,
{
    let mut response = None;
    let mut first_exchange = true;

    loop {
        let request = match interaction.step(response.take())? {
            Step::Done(output) => return Ok(output),
            Step::Exchange(request) => request,
        };

        debug!(
            "apdu > ins={:?} p1={:#04x} p2={:#04x} data={}",
            request.ins,
            request.p1,
            request.p2,
            hex::encode(&request.data)
        );

        let mut answer = transport
            .exchange(&request.command())
            .await
            .map_err(anyhow::Error::new)?;
        let mut status = StatusCode(answer.retcode());

        if status == StatusCode::ERR_STILL_IN_CALL && first_exchange {
            debug!("device still in call, retrying first apdu");
            answer = transport
                .exchange(&request.command())
                .await
                .map_err(anyhow::Error::new)?;
            status = StatusCode(answer.retcode());
        }
        first_exchange = false;

        debug!("apdu < status={} data={}", status, hex::encode(answer.data()));

        if !status.is_success() {
            return Err(Error::DeviceStatus(status));
        }

        let data = answer.data().to_vec();
        if let Some(expected) = request.expected_response_len {
            if data.len() != expected {
                return Err(Error::Protocol(ProtocolError::ResponseLength {
                    got: data.len(),
                    expected,
                }));
            }
        }
        response = Some(data);
    }
}
