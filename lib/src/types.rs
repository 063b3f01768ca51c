// Copyright (c) 2022-2023 The FIO Protocol

//! Public request and response types
//!
//! Amounts and fees are decimal strings (FIO suns); the parsing layer
//! range-checks them against u64. Transactions follow the FIO chain JSON
//! shape with exactly one action.

use serde::{Deserialize, Serialize};

pub use ledger_fio_apdu::path::{Bip32Path, HARDENED};

bitflags::bitflags! {
    /// App version flags
    #[derive(Default)]
    pub struct AppFlags: u8 {
        const IS_DEBUG = 0x01;
    }
}

/// App version reported by the device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub flags: AppFlags,
}

/// Compatibility of the connected app with this library
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceCompatibility {
    pub is_compatible: bool,
    /// Minimum recommended app version when incompatible
    pub recommended_version: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetVersionResponse {
    pub version: Version,
    pub compatibility: DeviceCompatibility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GetSerialResponse {
    pub serial_hex: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GetPublicKeyResponse {
    /// 65-byte uncompressed SECP256k1 key, hex
    pub public_key_hex: String,
    /// FIO wallet import format of the compressed key
    pub public_key_wif: String,
}

/// Witness produced by the device for one signing path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    pub path: Bip32Path,
    pub witness_signature_hex: String,
}

/// Result of a signing session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransactionData {
    pub tx_hash_hex: String,
    pub witness: Witness,
    /// Base64 DH-encrypted payload accumulated from any encryption
    /// sub-stream, empty when the action has none
    pub dh_encrypted_data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAuthorization {
    pub actor: String,
    pub permission: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub account: String,
    pub name: String,
    pub authorization: Vec<ActionAuthorization>,
    pub data: ActionData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// ISO-8601 expiration timestamp
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    /// Unsupported; must be empty
    #[serde(default)]
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
}

/// Per-action request payloads, one variant per supported on-chain action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionData {
    TransferTokens(TransferTokensData),
    RequestFunds(RequestFundsData),
    RecordObt(RecordObtData),
    RejectFundsRequest(FundsRequestOpData),
    CancelFundsRequest(FundsRequestOpData),
    AddAddress(AddressMappingData),
    RemoveAddress(AddressMappingData),
    RemoveAllAddresses(FioAddressOpData),
    AddNft(NftMappingData),
    RemoveAllNfts(FioAddressOpData),
    RegisterAddress(RegisterAddressData),
    TransferAddress(TransferAddressData),
    RegisterDomain(RegisterDomainData),
    RenewDomain(DomainOpData),
    TransferDomain(TransferDomainData),
    SetDomainPublic(SetDomainPublicData),
    Stake(StakeData),
    Unstake(StakeData),
    VoteProducer(VoteProducerData),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTokensData {
    pub payee_public_key: String,
    pub amount: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFundsData {
    pub payer_fio_address: String,
    pub payee_fio_address: String,
    /// Counterparty DH key, hex of the 65-byte uncompressed point
    pub payee_public_key: String,
    pub payee_public_address: String,
    pub amount: String,
    pub chain_code: String,
    pub token_code: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub offline_url: Option<String>,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordObtData {
    pub fio_request_id: String,
    pub payer_fio_address: String,
    pub payee_fio_address: String,
    /// Counterparty DH key, hex of the 65-byte uncompressed point
    pub payee_public_key: String,
    pub payer_public_address: String,
    pub payee_public_address: String,
    pub amount: String,
    pub chain_code: String,
    pub token_code: String,
    pub status: String,
    pub obt_id: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub offline_url: Option<String>,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

/// Shared by reject and cancel funds request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsRequestOpData {
    pub fio_request_id: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAddress {
    pub chain_code: String,
    pub token_code: String,
    pub public_address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMappingData {
    pub fio_address: String,
    pub public_addresses: Vec<PublicAddress>,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FioAddressOpData {
    pub fio_address: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub chain_code: String,
    pub contract_address: String,
    pub token_id: String,
    pub url: String,
    pub hash: String,
    pub metadata: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMappingData {
    pub fio_address: String,
    pub nfts: Vec<Nft>,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAddressData {
    pub fio_address: String,
    pub owner_fio_public_key: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAddressData {
    pub fio_address: String,
    pub new_owner_fio_public_key: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDomainData {
    pub fio_domain: String,
    pub owner_fio_public_key: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOpData {
    pub fio_domain: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDomainData {
    pub fio_domain: String,
    pub new_owner_fio_public_key: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDomainPublicData {
    pub fio_domain: String,
    pub is_public: bool,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeData {
    pub fio_address: String,
    pub amount: String,
    pub max_fee: String,
    pub actor: String,
    pub tpid: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteProducerData {
    pub producers: Vec<String>,
    pub fio_address: String,
    pub actor: String,
    pub max_fee: String,
}

/// Message kind passed to the on-device DH decoder
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[repr(u8)]
pub enum DecodeContext {
    NewFundsRequest = 0x01,
    RecordObt = 0x02,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeMessageResponse {
    pub message: Vec<u8>,
}
