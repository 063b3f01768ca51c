// Copyright (c) 2022-2023 The FIO Protocol

//! EOSIO/FIO name strings
//!
//! Account, action and permission names are ≤12-character identifiers over
//! the alphabet `[1-5a-z.]`, packed 5 bits per character into a fixed 8-byte
//! buffer (the `pushName` encoding from the FIO chain serializer). The host
//! only ever encodes; decoding happens on-device.

use crate::ProtocolError;

pub const MAX_NAME_LENGTH: usize = 12;

/// A name string packed into its 8-byte on-chain representation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name([u8; 8]);

// 'a'..'z' -> 6..31, '1'..'5' -> 1..5, '.' -> 0
fn char_to_symbol(c: u8) -> u8 {
    match c {
        b'a'..=b'z' => c - b'a' + 6,
        b'1'..=b'5' => c - b'1' + 1,
        _ => 0,
    }
}

fn is_name_string(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LENGTH
        && name
            .bytes()
            .all(|c| matches!(c, b'1'..=b'5' | b'a'..=b'z' | b'.'))
}

impl Name {
    pub fn parse(name: &str) -> Result<Self, ProtocolError> {
        if !is_name_string(name) {
            return Err(ProtocolError::InvalidName);
        }

        let mut packed = [0u8; 8];
        let mut bit: i32 = 63;
        for c in name.bytes() {
            let mut symbol = char_to_symbol(c);
            // The 13th character only gets the low 4 bits; shift up so its
            // high bits land in the remaining space
            if bit < 5 {
                symbol <<= 1;
            }
            for j in (0..5).rev() {
                if bit >= 0 {
                    packed[(bit / 8) as usize] |= ((symbol >> j) & 1) << (bit % 8);
                    bit -= 1;
                }
            }
        }
        Ok(Self(packed))
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}
