// Copyright (c) 2022-2023 The FIO Protocol

//! Device status words
//!
//! Every response carries a two-byte trailing status. [`StatusCode::SUCCESS`]
//! (0x9000) means success, everything else maps to a device-side failure.
//! The table of known codes is not exhaustive; unknown values get a generic
//! description carrying the raw hex code.

/// Raw status word returned by the device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESS: StatusCode = StatusCode(0x9000);

    /// Device APDU state machine was left mid-exchange by an aborted call
    /// and has reset itself. Safe to retry the first APDU once.
    pub const ERR_STILL_IN_CALL: StatusCode = StatusCode(0x6e04);

    pub const ERR_INVALID_REQUEST_PARAMETERS: StatusCode = StatusCode(0x6e05);
    pub const ERR_INVALID_STATE: StatusCode = StatusCode(0x6e06);
    pub const ERR_INVALID_DATA: StatusCode = StatusCode(0x6e07);
    pub const ERR_INVALID_BIP_PATH: StatusCode = StatusCode(0x6e08);
    pub const ERR_REJECTED_BY_USER: StatusCode = StatusCode(0x6e09);
    pub const ERR_REJECTED_BY_POLICY: StatusCode = StatusCode(0x6e10);
    pub const ERR_DEVICE_LOCKED: StatusCode = StatusCode(0x6e11);
    pub const ERR_UNSUPPORTED_ADDRESS_TYPE: StatusCode = StatusCode(0x6e12);

    // Thrown by the Ledger OS rather than the app itself
    pub const ERR_CLA_NOT_SUPPORTED: StatusCode = StatusCode(0x6e00);

    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Human-readable description of the status word
    pub fn description(&self) -> String {
        let msg = match *self {
            Self::ERR_INVALID_REQUEST_PARAMETERS => "Invalid request parameters",
            Self::ERR_INVALID_STATE => "Invalid device state",
            Self::ERR_INVALID_DATA => "Invalid data supplied to Ledger",
            Self::ERR_INVALID_BIP_PATH => "Invalid derivation path supplied to Ledger",
            Self::ERR_REJECTED_BY_USER => "Action rejected by user",
            Self::ERR_REJECTED_BY_POLICY => "Action rejected by Ledger's security policy",
            Self::ERR_DEVICE_LOCKED => "Device is locked",
            Self::ERR_UNSUPPORTED_ADDRESS_TYPE => "Unsupported address type",
            Self::ERR_CLA_NOT_SUPPORTED => "Wrong Ledger app",
            StatusCode(code) => return format!("General error 0x{code:x}"),
        };
        msg.to_string()
    }
}

impl core::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (0x{:04x})", self.description(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_messages() {
        assert_eq!(
            StatusCode::ERR_REJECTED_BY_USER.description(),
            "Action rejected by user"
        );
        assert_eq!(StatusCode::ERR_DEVICE_LOCKED.0, 0x6e11);
        assert!(StatusCode::SUCCESS.is_success());
    }

    #[test]
    fn unknown_code_falls_back_to_generic() {
        assert_eq!(StatusCode(0x6f42).description(), "General error 0x6f42");
    }
}
