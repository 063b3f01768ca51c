// Copyright (c) 2022-2023 The FIO Protocol

//! Device operations as step-function state machines

mod decode_message;
mod get_public_key;
mod get_serial;
mod get_version;
mod sign_transaction;

pub(crate) use decode_message::DecodeMessage;
pub(crate) use get_public_key::GetPublicKey;
pub(crate) use get_serial::GetSerial;
pub(crate) use get_version::GetVersion;
pub(crate) use run_tests::RunTests;
pub(crate) use sign_transaction::SignTransaction;
