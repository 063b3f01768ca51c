// Copyright (c) 2022-2023 The FIO Protocol

//! Protocol / APDU definitions for FIO app communication
//!
//! This crate provides the wire-level building blocks for talking to the FIO
//! Ledger app: instruction codes, device status codes, the binary codec used
//! for transaction serialization (fixed-width integers, LEB128 varints,
//! EOSIO name packing, BIP32 paths) and the [`Command`][command::Command]
//! model the transaction signing stream is compiled into.
//!
//! Every signing command travels inside a single APDU whose payload is
//! `[constLen u8][varLen u8][constData][varData]` with a hard 255-byte
//! ceiling. `constData` describes how the device should validate and display
//! the field carried in `varData`.

pub mod command;
pub mod name;
pub mod path;
pub mod serialize;
pub mod status;

mod error;
pub use error::ProtocolError;

/// FIO APDU class
pub const FIO_APDU_CLA: u8 = 0xd7;

/// Maximum APDU payload length, including the two length prefix bytes
pub const MAX_APDU_PAYLOAD: usize = 255;

/// FIO APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch app version and flags
    GetVersion = 0x00,

    /// Fetch device serial number
    GetSerial = 0x01,

    /// Derive an extended public key for a BIP32 path
    GetExtPublicKey = 0x10,

    /// Stream a transaction for signing
    SignTx = 0x20,

    /// Decode a DH-encrypted message
    DecodeMessage = 0x30,

    /// On-device self tests (debug builds only)
    RunTests = 0xf0,
}
