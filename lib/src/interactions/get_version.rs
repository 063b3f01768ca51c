// Copyright (c) 2022-2023 The FIO Protocol

use ledger_fio_apdu::{Instruction, ProtocolError};

use crate::{
    error::Error,
    interaction::{get_compatibility, ApduRequest, Interaction, Step},
    types::{AppFlags, GetVersionResponse, Version},
};

/// `GET_VERSION`: single exchange, 4-byte response
/// `[major][minor][patch][flags]`
#[derive(Default)]
pub(crate) struct GetVersion;

impl GetVersion {
    pub fn new() -> Self {
        Self
    }
}

impl Interaction for GetVersion {
    type Output = GetVersionResponse;

    fn step(&mut self, response: Option<Vec<u8>>) -> Result<Step<Self::Output>, Error> {
        let data = match response {
            None => {
                let req = ApduRequest::new(Instruction::GetVersion, 0, 0, Vec::new())
                    .expecting(Some(4));
                return Ok(Step::Exchange(req));
            }
            Some(data) => data,
        };

        if data.len() != 4 {
            return Err(ProtocolError::ResponseLength {
                got: data.len(),
                expected: 4,
            }
            .into());
        }

        let version = Version {
            major: data[0],
            minor: data[1],
            patch: data[2],
            flags: AppFlags::from_bits_truncate(data[3]),
        };
        Ok(Step::Done(GetVersionResponse {
            compatibility: get_compatibility(&version),
            version,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_response() {
        let mut interaction = GetVersion::new();

        let req = match interaction.step(None).unwrap() {
            Step::Exchange(req) => req,
            Step::Done(_) => panic!("expected exchange"),
        };
        assert_eq!(req.ins, Instruction::GetVersion);
        assert_eq!(req.expected_response_len, Some(4));

        let resp = match interaction.step(Some(vec![0, 0, 5, 1])).unwrap() {
            Step::Done(resp) => resp,
            Step::Exchange(_) => panic!("expected done"),
        };
        assert_eq!(resp.version.patch, 5);
        assert!(resp.version.flags.contains(AppFlags::IS_DEBUG));
        assert!(resp.compatibility.is_compatible);
    }
}
