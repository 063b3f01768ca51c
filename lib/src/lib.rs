// Copyright (c) 2022-2023 The FIO Protocol

//! FIO Ledger API Library
//!
//! Host-side driver for the FIO app running on Ledger hardware wallets.
//! Operations are modelled as step-function [`Interaction`]s compiled down to
//! APDU exchanges; [`Fio`] drives them over anything implementing
//! [`Exchange`], so the same code talks to a USB device, speculos or a mock.
//!
//! ```no_run
//! # #[cfg(feature = "transport_hid")]
//! # async fn example() -> Result<(), ledger_fio::Error> {
//! use ledger_fio::{transport, Fio};
//!
//! let device = Fio::from(transport::connect_hid()?);
//! let version = device.get_version().await?;
//! println!("FIO app {}.{}.{}", version.version.major, version.version.minor, version.version.patch);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

pub use ledger_transport::Exchange;

/// Re-export transports for consumer use
pub mod transport;

/// Re-export `ledger-fio-apdu` for consumers
pub use ledger_fio_apdu::{self as apdu};

mod error;
pub use error::{Error, InvalidDataReason};

mod interaction;
pub use interaction::{
    get_compatibility, ApduRequest, Interaction, Step, RECOMMENDED_VERSION,
};

mod interactions;
mod parse;
mod templates;

pub mod types;

use apdu::path::Bip32Path;
use interaction::{interact, WithVersionCheck};
use interactions::{
    DecodeMessage, GetPublicKey, GetSerial, GetVersion, RunTests, SignTransaction,
};
use types::{
    DecodeContext, DecodeMessageResponse, GetPublicKeyResponse, GetSerialResponse,
    GetVersionResponse, SignedTransactionData, Transaction,
};

/// Handle to the FIO app on a connected device
///
/// Exchanges are serialized through a mutex, so clones of a handle may be
/// used concurrently from multiple tasks.
pub struct Fio<T> {
    transport: Arc<Mutex<T>>,
}

impl<T> From<T> for Fio<T> {
    fn from(transport: T) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
        }
    }
}

impl<T> Clone for Fio<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<T> Fio<T>
where
    T: Exchange + Send + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    /// Fetch the app version and its compatibility with this library
    ///
    /// The only operation not gated on a version check itself.
    pub async fn get_version(&self) -> Result<GetVersionResponse, Error> {
        let t = self.transport.lock().await;
        interact(&*t, GetVersion::new()).await
    }

    /// Fetch the device serial number
    pub async fn get_serial(&self) -> Result<GetSerialResponse, Error> {
        let t = self.transport.lock().await;
        interact(&*t, WithVersionCheck::new(GetSerial::new())).await
    }

    /// Derive the public key for a BIP32 path, optionally confirming the
    /// derivation on the device screen
    pub async fn get_public_key(
        &self,
        path: &[u32],
        show: bool,
    ) -> Result<GetPublicKeyResponse, Error> {
        let path = Bip32Path::try_from(path)?;
        debug!("get_public_key path={:?} show={}", path.components(), show);

        let t = self.transport.lock().await;
        interact(&*t, WithVersionCheck::new(GetPublicKey::new(path, show))).await
    }

    /// Sign a transaction with the key for the given path
    ///
    /// The transaction is validated and compiled host-side; compilation
    /// failures surface as [`Error::InvalidData`] before any exchange.
    pub async fn sign_transaction(
        &self,
        chain_id: &str,
        tx: &Transaction,
        path: &[u32],
    ) -> Result<SignedTransactionData, Error> {
        let path = Bip32Path::try_from(path)?;
        let commands = templates::compile(chain_id, tx, &path)?;
        debug!("sign_transaction: {} commands compiled", commands.len());

        let t = self.transport.lock().await;
        interact(
            &*t,
            WithVersionCheck::new(SignTransaction::new(commands, path)),
        )
        .await
    }

    /// Decrypt a DH-encrypted message (new funds request or OBT record
    /// content) with the secret shared between the path key and the
    /// counterparty key
    pub async fn decode_message(
        &self,
        message_hex: &str,
        peer_public_key: &str,
        path: &[u32],
        context: DecodeContext,
    ) -> Result<DecodeMessageResponse, Error> {
        let message =
            hex::decode(message_hex).map_err(|_| InvalidDataReason::InvalidMessage)?;
        let peer_public_key = parse::parse_dh_public_key(peer_public_key)?;
        let path = Bip32Path::try_from(path)?;
        debug!("decode_message: {} bytes, context {}", message.len(), context);

        let t = self.transport.lock().await;
        interact(
            &*t,
            WithVersionCheck::new(DecodeMessage::new(message, peer_public_key, path, context)),
        )
        .await
    }

    /// Trigger the on-device self tests; only available in debug builds of
    /// the app
    pub async fn run_tests(&self) -> Result<(), Error> {
        let t = self.transport.lock().await;
        interact(&*t, WithVersionCheck::new(RunTests::new())).await
    }
}
