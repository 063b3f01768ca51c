// Copyright (c) 2022-2023 The FIO Protocol

//! BIP32 derivation paths
//!
//! FIO keys live under `44'/235'/0'/0/i`. The device accepts at most five
//! path components, each an unsigned 32-bit word with the top bit marking a
//! hardened derivation.

use crate::{serialize::uint32_to_buf, ProtocolError};

/// Hardened derivation marker bit
pub const HARDENED: u32 = 0x80000000;

/// Maximum number of path components accepted by the device
pub const MAX_PATH_LEN: usize = 5;

/// A validated BIP32 derivation path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bip32Path(Vec<u32>);

impl Bip32Path {
    pub fn new(components: Vec<u32>) -> Result<Self, ProtocolError> {
        if components.len() > MAX_PATH_LEN {
            return Err(ProtocolError::InvalidPath);
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// Wire encoding: 1-byte component count followed by one little-endian
    /// u32 word per component
    pub fn to_buf(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.0.len() * 4);
        buf.push(self.0.len() as u8);
        for component in &self.0 {
            buf.extend_from_slice(&uint32_to_buf(*component));
        }
        buf
    }
}

impl TryFrom<&[u32]> for Bip32Path {
    type Error = ProtocolError;

    fn try_from(value: &[u32]) -> Result<Self, Self::Error> {
        Self::new(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_length_prefix_and_le_words() {
        let path = Bip32Path::new(vec![HARDENED + 44, HARDENED + 235, HARDENED, 0, 0]).unwrap();
        let buf = path.to_buf();
        assert_eq!(buf.len(), 21);
        assert_eq!(buf[0], 5);
        assert_eq!(&buf[1..5], &[44, 0, 0, 0x80]);
        assert_eq!(&buf[5..9], &[235, 0, 0, 0x80]);
    }

    #[test]
    fn rejects_long_paths() {
        assert_eq!(
            Bip32Path::new(vec![0; 6]),
            Err(ProtocolError::InvalidPath)
        );
    }
}
