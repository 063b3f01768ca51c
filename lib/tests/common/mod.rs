// Copyright (c) 2022-2023 The FIO Protocol

//! Scripted mock transport for driving interactions without a device

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    ops::Deref,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use ledger_apdu::{APDUAnswer, APDUCommand};
use ledger_transport::Exchange;

pub const SW_OK: u16 = 0x9000;

/// One APDU as seen by the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedApdu {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
#[error("mock transport: no scripted response left")]
pub struct MockError;

type Handler = Box<dyn Fn(&RecordedApdu) -> Vec<u8> + Send + Sync>;

/// Transport double: answers either from a fixed script popped in order, or
/// from a handler computing the answer per request. Every command sent is
/// recorded.
pub struct MockTransport {
    script: Mutex<VecDeque<Vec<u8>>>,
    handler: Option<Handler>,
    sent: Arc<Mutex<Vec<RecordedApdu>>>,
}

impl MockTransport {
    pub fn new(script: impl IntoIterator<Item = Vec<u8>>) -> Self {
        init_logging();
        Self {
            script: Mutex::new(script.into_iter().collect()),
            handler: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn respond_with(handler: impl Fn(&RecordedApdu) -> Vec<u8> + Send + Sync + 'static) -> Self {
        init_logging();
        Self {
            script: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of sent commands, usable after the transport moved into a
    /// device handle
    pub fn recorder(&self) -> Arc<Mutex<Vec<RecordedApdu>>> {
        self.sent.clone()
    }
}

/// Answer bytes: data followed by the big-endian status word
pub fn answer(data: &[u8], status: u16) -> Vec<u8> {
    let mut out = data.to_vec();
    out.extend_from_slice(&status.to_be_bytes());
    out
}

pub fn ok(data: &[u8]) -> Vec<u8> {
    answer(data, SW_OK)
}

pub fn version_ok() -> Vec<u8> {
    ok(&[0, 0, 5, 0])
}

fn init_logging() {
    let _ = simplelog::SimpleLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
    );
}

#[async_trait]
impl Exchange for MockTransport {
    type Error = MockError;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Vec<u8>>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let recorded = RecordedApdu {
            cla: command.cla,
            ins: command.ins,
            p1: command.p1,
            p2: command.p2,
            data: command.data.to_vec(),
        };
        self.sent.lock().unwrap().push(recorded.clone());

        let raw = match &self.handler {
            Some(handler) => handler(&recorded),
            None => self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(MockError)?,
        };
        APDUAnswer::from_answer(raw).map_err(|_| MockError)
    }
}
