// Copyright (c) 2022-2023 The FIO Protocol

//! Transaction signing command model
//!
//! A signing session is compiled into an ordered list of [`Command`] values,
//! each sent as one `SIGN_TX` APDU. The command opcode travels in P1,
//! `const_data` carries fixed per-field metadata (format, validation bounds,
//! display policy) and `var_data` carries the actual payload bytes.
//!
//! Counted sections wrap a sub-stream with a varint length prefix so the
//! device can validate nested structures without buffering the whole
//! transaction; DH sections additionally account for the encryption and
//! Base64 expansion the device applies to the wrapped bytes.

use crate::{
    path::Bip32Path,
    serialize::{chunk_by, lenlen, uint64_to_buf, varuint32_to_buf},
    ProtocolError, MAX_APDU_PAYLOAD,
};

/// Signing command opcodes, sent as P1 of a `SIGN_TX` APDU
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    Init = 0x01,
    AppendConstData = 0x02,
    ShowMessage = 0x03,
    AppendData = 0x04,
    StartCountedSection = 0x05,
    EndCountedSection = 0x06,
    StoreValue = 0x07,
    StartDhEncryption = 0x08,
    EndDhEncryption = 0x09,
    Finish = 0x10,
}

/// How the device interprets the variable data of an append-data command
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum ValueFormat {
    BufferShowAsHex = 0x01,
    AsciiString = 0x02,
    Name = 0x03,
    AsciiStringWithLength = 0x04,
    ChainCodeTokenCodePublicAddr = 0x05,
    ChainCodeContractAddrTokenId = 0x06,
    FioAmount = 0x10,
    Uint64 = 0x14,
    VarUint32 = 0x17,
}

/// Validation the device applies against the `arg1..arg2` bounds
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum ValueValidation {
    None = 1,
    InBufferLength = 2,
    Number = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum ValuePolicy {
    Show = 5,
    DoNotShow = 2,
}

/// Register comparison requested alongside an append-data command
///
/// Shares the policy byte with [`ValuePolicy`]; `Register1DecodeName`
/// compares against register 1 after decoding the value as a name string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::IntoPrimitive)]
#[repr(u8)]
pub enum StorageCompare {
    DoNotCompare = 0x00,
    Register1 = 0x10,
    Register2 = 0x20,
    Register3 = 0x30,
    Register1DecodeName = 0x40,
}

/// Default upper bound for unbounded string fields
pub const DEFAULT_MAX_LENGTH: u64 = 0xffff_ffff_ffff;

/// Expected FINISH response: 65-byte witness signature + 32-byte tx hash
pub const FINISH_RESPONSE_LENGTH: usize = 65 + 32;

/// Result accumulator threaded through command execution
///
/// Starts empty; DH commands append encrypted fragments, FINISH fills in the
/// hash and witness signature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignAccumulator {
    pub dh_encrypted_data: String,
    pub tx_hash_hex: Option<String>,
    pub witness_signature_hex: Option<String>,
}

/// Fold applied to a command's response bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataAction {
    /// Response carries no data of interest
    Ignore,

    /// Response is a Base64 fragment of the DH-encrypted payload
    AppendDhPayload,

    /// Response is the 97-byte signature + hash pair
    Finish,
}

impl DataAction {
    pub fn fold(
        &self,
        response: &[u8],
        mut acc: SignAccumulator,
    ) -> Result<SignAccumulator, ProtocolError> {
        match self {
            DataAction::Ignore => Ok(acc),
            DataAction::AppendDhPayload => {
                let fragment =
                    core::str::from_utf8(response).map_err(|_| ProtocolError::Utf8)?;
                acc.dh_encrypted_data.push_str(fragment);
                Ok(acc)
            }
            DataAction::Finish => {
                let (chunks, rest) = chunk_by(response, &[65, 32])?;
                if !rest.is_empty() {
                    return Err(ProtocolError::ResponseLength {
                        got: response.len(),
                        expected: FINISH_RESPONSE_LENGTH,
                    });
                }
                acc.witness_signature_hex = Some(hex::encode(chunks[0]));
                acc.tx_hash_hex = Some(hex::encode(chunks[1]));
                Ok(acc)
            }
        }
    }
}

/// One step of the signing stream
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub command: CommandCode,
    pub p2: u8,
    pub const_data: Vec<u8>,
    pub var_data: Vec<u8>,

    /// Response length enforced by the driver, `None` for variable
    pub expected_response_len: Option<usize>,

    /// Bytes this command contributes to enclosing counted sections
    pub tx_len: usize,

    pub data_action: DataAction,
}

impl Command {
    fn new(command: CommandCode) -> Self {
        Self {
            command,
            p2: 0,
            const_data: Vec::new(),
            var_data: Vec::new(),
            expected_response_len: Some(0),
            tx_len: 0,
            data_action: DataAction::Ignore,
        }
    }

    /// APDU payload: `[constLen][varLen][constData][varData]`
    ///
    /// Exceeding the single-APDU ceiling is a template bug, not a runtime
    /// condition, so it fails loudly.
    pub fn payload(&self) -> Result<Vec<u8>, ProtocolError> {
        let total = 2 + self.const_data.len() + self.var_data.len();
        if total > MAX_APDU_PAYLOAD || self.const_data.len() > 255 || self.var_data.len() > 255 {
            return Err(ProtocolError::PayloadTooLarge(total));
        }

        let mut payload = Vec::with_capacity(total);
        payload.push(self.const_data.len() as u8);
        payload.push(self.var_data.len() as u8);
        payload.extend_from_slice(&self.const_data);
        payload.extend_from_slice(&self.var_data);
        Ok(payload)
    }
}

// [format][validation][arg1 u64le][arg2 u64le][policy|storage][keyLen][key]
fn const_data_append_data(
    format: ValueFormat,
    validation: ValueValidation,
    arg1: u64,
    arg2: u64,
    policy: ValuePolicy,
    storage: StorageCompare,
    key: &str,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(20 + key.len());
    buf.push(format.into());
    buf.push(validation.into());
    buf.extend_from_slice(&uint64_to_buf(arg1));
    buf.extend_from_slice(&uint64_to_buf(arg2));
    buf.push(u8::from(policy) | u8::from(storage));
    buf.push(key.len() as u8);
    buf.extend_from_slice(key.as_bytes());
    buf
}

fn const_data_counted_section(
    format: ValueFormat,
    validation: ValueValidation,
    arg1: u64,
    arg2: u64,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(18);
    buf.push(format.into());
    buf.push(validation.into());
    buf.extend_from_slice(&uint64_to_buf(arg1));
    buf.extend_from_slice(&uint64_to_buf(arg2));
    buf
}

/// Generic append-data builder; the convenience wrappers below cover the
/// combinations the templates actually use
pub fn append_data(
    format: ValueFormat,
    validation: ValueValidation,
    arg1: u64,
    arg2: u64,
    policy: ValuePolicy,
    storage: StorageCompare,
    key: &str,
    var_data: Vec<u8>,
) -> Command {
    let tx_len = var_data.len();
    Command {
        const_data: const_data_append_data(format, validation, arg1, arg2, policy, storage, key),
        var_data,
        tx_len,
        ..Command::new(CommandCode::AppendData)
    }
}

/// Session setup: chain id plus the signing path
pub fn init(chain_id: &[u8; 32], path: &Bip32Path) -> Command {
    let mut var_data = Vec::with_capacity(32 + 21);
    var_data.extend_from_slice(chain_id);
    var_data.extend_from_slice(&path.to_buf());
    Command {
        var_data,
        ..Command::new(CommandCode::Init)
    }
}

/// Append bytes known to the device protocol (markers, packed names)
pub fn append_const_data(data: Vec<u8>) -> Command {
    let tx_len = data.len();
    Command {
        const_data: data,
        tx_len,
        ..Command::new(CommandCode::AppendConstData)
    }
}

/// Display a key/value pair on the device without appending tx bytes
pub fn show_message(key: &str, value: &str) -> Command {
    let mut const_data = Vec::with_capacity(2 + key.len() + value.len());
    const_data.push(key.len() as u8);
    const_data.extend_from_slice(key.as_bytes());
    const_data.push(value.len() as u8);
    const_data.extend_from_slice(value.as_bytes());
    Command {
        const_data,
        ..Command::new(CommandCode::ShowMessage)
    }
}

/// Store a value in one of the device compare registers
pub fn store_value(register: u8, value: &[u8]) -> Command {
    Command {
        p2: register,
        var_data: value.to_vec(),
        ..Command::new(CommandCode::StoreValue)
    }
}

pub fn append_buffer_do_not_show(
    data: Vec<u8>,
    min: u64,
    max: u64,
    storage: StorageCompare,
) -> Command {
    append_data(
        ValueFormat::BufferShowAsHex,
        ValueValidation::InBufferLength,
        min,
        max,
        ValuePolicy::DoNotShow,
        storage,
        "",
        data,
    )
}

pub fn append_string_show(key: &str, data: &[u8], min: u64, max: u64) -> Command {
    append_data(
        ValueFormat::AsciiString,
        ValueValidation::InBufferLength,
        min,
        max,
        ValuePolicy::Show,
        StorageCompare::DoNotCompare,
        key,
        data.to_vec(),
    )
}

pub fn append_string_do_not_show(
    data: &[u8],
    min: u64,
    max: u64,
    storage: StorageCompare,
) -> Command {
    append_data(
        ValueFormat::AsciiString,
        ValueValidation::InBufferLength,
        min,
        max,
        ValuePolicy::DoNotShow,
        storage,
        "",
        data.to_vec(),
    )
}

// Length-prefixed strings carry their own u8 length in var_data so the
// device can append them as chain-serialized string fields.
fn length_prefixed(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + data.len());
    buf.push(data.len() as u8);
    buf.extend_from_slice(data);
    buf
}

pub fn append_string_with_length_show(key: &str, data: &[u8], min: u64, max: u64) -> Command {
    append_data(
        ValueFormat::AsciiStringWithLength,
        ValueValidation::InBufferLength,
        min,
        max,
        ValuePolicy::Show,
        StorageCompare::DoNotCompare,
        key,
        length_prefixed(data),
    )
}

pub fn append_string_with_length_do_not_show(data: &[u8], min: u64, max: u64) -> Command {
    append_data(
        ValueFormat::AsciiStringWithLength,
        ValueValidation::InBufferLength,
        min,
        max,
        ValuePolicy::DoNotShow,
        StorageCompare::DoNotCompare,
        "",
        length_prefixed(data),
    )
}

/// Append an amount in FIO suns; callers pass big-endian bytes so the device
/// can render the most significant digits first
pub fn append_fio_amount_show(key: &str, data: Vec<u8>) -> Command {
    append_data(
        ValueFormat::FioAmount,
        ValueValidation::Number,
        0,
        u64::MAX,
        ValuePolicy::Show,
        StorageCompare::DoNotCompare,
        key,
        data,
    )
}

/// Blockchain public address mapping entry: chain code, token code and
/// address as consecutive length-prefixed strings
pub fn append_public_address_show(
    key: &str,
    chain_code: &str,
    token_code: &str,
    public_address: &str,
) -> Command {
    let mut var_data = Vec::new();
    var_data.extend_from_slice(&length_prefixed(chain_code.as_bytes()));
    var_data.extend_from_slice(&length_prefixed(token_code.as_bytes()));
    var_data.extend_from_slice(&length_prefixed(public_address.as_bytes()));
    append_data(
        ValueFormat::ChainCodeTokenCodePublicAddr,
        ValueValidation::None,
        0,
        DEFAULT_MAX_LENGTH,
        ValuePolicy::Show,
        StorageCompare::DoNotCompare,
        key,
        var_data,
    )
}

/// NFT mapping entry: chain code, contract address and token id as
/// consecutive length-prefixed strings
pub fn append_nft_show(
    key: &str,
    chain_code: &str,
    contract_address: &str,
    token_id: &str,
) -> Command {
    let mut var_data = Vec::new();
    var_data.extend_from_slice(&length_prefixed(chain_code.as_bytes()));
    var_data.extend_from_slice(&length_prefixed(contract_address.as_bytes()));
    var_data.extend_from_slice(&length_prefixed(token_id.as_bytes()));
    append_data(
        ValueFormat::ChainCodeContractAddrTokenId,
        ValueValidation::None,
        0,
        DEFAULT_MAX_LENGTH,
        ValuePolicy::Show,
        StorageCompare::DoNotCompare,
        key,
        var_data,
    )
}

/// Total tx byte contribution of a command list
pub fn stream_tx_len(commands: &[Command]) -> u64 {
    commands.iter().map(|c| c.tx_len as u64).sum()
}

/// Wrap commands in a counted section with default bounds
pub fn counted_section(inner: Vec<Command>) -> Vec<Command> {
    counted_section_bounded(inner, 0, DEFAULT_MAX_LENGTH)
}

/// Wrap commands in a counted section
///
/// The START command's var data is the varint-encoded total of the inner
/// commands' `tx_len`; the varint itself counts toward any enclosing section.
pub fn counted_section_bounded(mut inner: Vec<Command>, min: u64, max: u64) -> Vec<Command> {
    let inner_len = stream_tx_len(&inner);
    let var_data = varuint32_to_buf(inner_len);
    debug_assert_eq!(var_data.len(), lenlen(inner_len));

    let start = Command {
        const_data: const_data_counted_section(
            ValueFormat::VarUint32,
            ValueValidation::Number,
            min,
            max,
        ),
        tx_len: var_data.len(),
        var_data,
        ..Command::new(CommandCode::StartCountedSection)
    };

    let mut commands = Vec::with_capacity(inner.len() + 2);
    commands.push(start);
    commands.append(&mut inner);
    commands.push(Command::new(CommandCode::EndCountedSection));
    commands
}

/// Enclosing byte length of a DH-encrypted sub-stream
///
/// Inner bytes plus a 32-byte IV+HMAC overhead, padded to the 16-byte cipher
/// block, then Base64-expanded at 4 output chars per 3 input bytes. These
/// constants are part of the device contract.
pub fn dh_encrypted_len(inner_len: usize) -> usize {
    let padded = (inner_len + 16 + 16).div_ceil(16) * 16;
    4 * (padded + 2).div_ceil(3)
}

/// Wrap commands in a DH encryption section keyed to `peer_public_key`
///
/// The device streams the encrypted payload back in Base64 fragments, so the
/// wrapped commands stop contributing raw tx bytes (the START command
/// accounts the expanded length instead) and their responses are folded into
/// the accumulator's `dh_encrypted_data`.
pub fn dh_encryption_section(peer_public_key: &[u8], mut inner: Vec<Command>) -> Vec<Command> {
    let inner_len = stream_tx_len(&inner) as usize;

    for command in &mut inner {
        command.tx_len = 0;
        command.expected_response_len = None;
        command.data_action = DataAction::AppendDhPayload;
    }

    let start = Command {
        var_data: peer_public_key.to_vec(),
        tx_len: dh_encrypted_len(inner_len),
        expected_response_len: None,
        data_action: DataAction::AppendDhPayload,
        ..Command::new(CommandCode::StartDhEncryption)
    };
    let end = Command {
        expected_response_len: None,
        data_action: DataAction::AppendDhPayload,
        ..Command::new(CommandCode::EndDhEncryption)
    };

    let mut commands = Vec::with_capacity(inner.len() + 2);
    commands.push(start);
    commands.append(&mut inner);
    commands.push(end);
    commands
}

/// Close the session: the device signs and returns signature + hash
pub fn finish(path: &Bip32Path) -> Command {
    Command {
        var_data: path.to_buf(),
        expected_response_len: Some(FINISH_RESPONSE_LENGTH),
        data_action: DataAction::Finish,
        ..Command::new(CommandCode::Finish)
    }
}
