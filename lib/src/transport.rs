// Copyright (c) 2022-2023 The FIO Protocol

//! Transport selection
//!
//! Re-exports the feature-gated transports the library is built with and a
//! convenience constructor for the default HID transport. Anything
//! implementing [`ledger_transport::Exchange`] works with [`crate::Fio`], so
//! speculos or mock transports plug in the same way.

#[cfg(feature = "transport_hid")]
pub use ledger_transport_hid::{LedgerHIDError, TransportNativeHID};

#[cfg(feature = "transport_hid")]
use crate::error::Error;

/// Connect to the first Ledger device reachable over USB HID
#[cfg(feature = "transport_hid")]
pub fn connect_hid() -> Result<TransportNativeHID, Error> {
    let api = hidapi::HidApi::new().map_err(anyhow::Error::new)?;
    let transport = TransportNativeHID::new(&api).map_err(anyhow::Error::new)?;
    Ok(transport)
}
