//! Utility functions for identifiers and serialization

use super::error::TransferError;
use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

pub fn to_cbor<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>, TransferError> {
    minicbor::to_vec(value).map_err(|e| TransferError::Codec(e.to_string()))
}

pub fn from_cbor<'b, T: minicbor::Decode<'b, ()>>(bytes: &'b [u8]) -> Result<T, TransferError> {
    minicbor::decode(bytes).map_err(|e| TransferError::Codec(e.to_string()))
}
