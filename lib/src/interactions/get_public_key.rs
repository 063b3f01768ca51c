// Copyright (c) 2022-2023 The FIO Protocol

use ledger_fio_apdu::{path::Bip32Path, Instruction, ProtocolError};
use ripemd::{Digest, Ripemd160};

use crate::{
    error::Error,
    interaction::{ApduRequest, Interaction, Step},
    types::GetPublicKeyResponse,
};

const P1_SHOW_ON_DEVICE: u8 = 0x01;
const PUBLIC_KEY_LENGTH: usize = 65;

/// `GET_EXT_PUBLIC_KEY`: derive the SECP256k1 key for a BIP32 path,
/// optionally confirming the derivation on-device
pub(crate) struct GetPublicKey {
    path: Bip32Path,
    show: bool,
}

impl GetPublicKey {
    pub fn new(path: Bip32Path, show: bool) -> Self {
        Self { path, show }
    }
}

impl Interaction for GetPublicKey {
    type Output = GetPublicKeyResponse;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error> {
        let data = match response {
            None => {
                let p1 = if self.show { P1_SHOW_ON_DEVICE } else { 0 };
                let req = ApduRequest::new(Instruction::GetExtPublicKey, p1, 0, self.path.to_buf())
                    .expecting(Some(PUBLIC_KEY_LENGTH));
                return Ok(Step::Exchange(req));
            }
            Some(data) => data,
        };

        let uncompressed: [u8; PUBLIC_KEY_LENGTH] =
            data.as_slice()
                .try_into()
                .map_err(|_| ProtocolError::ResponseLength {
                    got: data.len(),
                    expected: PUBLIC_KEY_LENGTH,
                })?;

        Ok(Step::Done(GetPublicKeyResponse {
            public_key_hex: hex::encode(uncompressed),
            public_key_wif: public_key_to_wif(&uncompressed),
        }))
    }
}

// SEC1 point compression: 0x02/0x03 prefix by y parity, then the x coordinate
fn compress(uncompressed: &[u8; 65]) -> [u8; 33] {
    let mut out = [0u8; 33];
    out[0] = if uncompressed[64] & 1 == 1 { 0x03 } else { 0x02 };
    out[1..].copy_from_slice(&uncompressed[1..33]);
    out
}

/// FIO wallet import format: `"FIO"` + Base58 of the compressed key followed
/// by the first four bytes of its RIPEMD-160 digest
pub(crate) fn public_key_to_wif(uncompressed: &[u8; 65]) -> String {
    let compressed = compress(uncompressed);
    let checksum = Ripemd160::digest(compressed);

    let mut payload = Vec::with_capacity(33 + 4);
    payload.extend_from_slice(&compressed);
    payload.extend_from_slice(&checksum[..4]);
    format!("FIO{}", bs58::encode(payload).into_string())
}
