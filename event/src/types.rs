//! Ledger primitives shared by every processor.
//!
//! Defines contract and peer identities, event kinds, mempool triggers,
//! decoded stack items and notary requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;
use crate::reputation::ReputationPutEvent;

/// Length of a contract script hash in bytes.
pub const CONTRACT_ADDRESS_LEN: usize = 20;

/// Length of a compressed public key in bytes.
pub const PEER_ID_LEN: usize = 33;

/// Script hash of a deployed contract.
///
/// Displayed as little-endian hex, the form used by ledger tooling.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ContractAddress([u8; CONTRACT_ADDRESS_LEN]);

impl ContractAddress {
    /// Creates an address from its big-endian bytes.
    #[must_use]
    pub const fn new(bytes: [u8; CONTRACT_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; CONTRACT_ADDRESS_LEN] {
        &self.0
    }

    /// Returns the little-endian hex representation.
    #[must_use]
    pub fn to_le_hex(&self) -> String {
        let mut le = self.0;
        le.reverse();
        hex::encode(le)
    }

    /// Parses a little-endian hex representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not 40 hex characters.
    pub fn from_le_hex(s: &str) -> Result<Self, ParseError> {
        let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let mut arr: [u8; CONTRACT_ADDRESS_LEN] =
            bytes
                .try_into()
                .map_err(|b: Vec<u8>| ParseError::InvalidLength {
                    field: "contract address",
                    expected: CONTRACT_ADDRESS_LEN,
                    actual: b.len(),
                })?;
        arr.reverse();
        Ok(Self(arr))
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_le_hex())
    }
}

impl fmt::Debug for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractAddress({})", self.to_le_hex())
    }
}

impl FromStr for ContractAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_le_hex(s)
    }
}

impl Serialize for ContractAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_le_hex())
    }
}

impl<'de> Deserialize<'de> for ContractAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Network peer identity: a compressed public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId([u8; PEER_ID_LEN]);

impl PeerId {
    /// Creates a peer ID from compressed public key bytes.
    #[must_use]
    pub const fn new(bytes: [u8; PEER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates a peer ID from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not exactly 33 bytes long.
    pub fn from_slice(field: &'static str, bytes: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; PEER_ID_LEN] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            field,
            expected: PEER_ID_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Returns the public key bytes.
    #[must_use]
    pub const fn public_key(&self) -> &[u8; PEER_ID_LEN] {
        &self.0
    }

    /// Returns the hex representation.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self.to_hex())
    }
}

impl FromStr for PeerId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Self::from_slice("peer id", &bytes)
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of business event recognised by the registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Reputation value submitted to the reputation contract.
    ReputationPut,
}

impl EventType {
    /// Every known event kind.
    pub const ALL: [Self; 1] = [Self::ReputationPut];

    /// Returns the name of the contract notification.
    #[must_use]
    pub const fn notification_name(&self) -> &'static str {
        match self {
            Self::ReputationPut => "reputationPut",
        }
    }

    /// Returns the contract method invoked by notary requests.
    #[must_use]
    pub const fn notary_method(&self) -> &'static str {
        match self {
            Self::ReputationPut => "put",
        }
    }

    /// Looks up an event kind by notification name.
    #[must_use]
    pub fn from_notification_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.notification_name() == name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notification_name())
    }
}

/// Mempool condition that triggers the notary path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MempoolEventType {
    /// A transaction entered the mempool.
    TransactionAdded,
    /// A transaction left the mempool.
    TransactionRemoved,
}

impl MempoolEventType {
    /// Returns a human-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionAdded => "added",
            Self::TransactionRemoved => "removed",
        }
    }
}

impl fmt::Display for MempoolEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded invocation stack item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackItem {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i128),
    /// Byte string.
    ByteArray(Vec<u8>),
    /// Nested items.
    Array(Vec<StackItem>),
}

impl StackItem {
    /// Returns the item kind name, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::ByteArray(_) => "byte array",
            Self::Array(_) => "array",
        }
    }

    /// Returns the integer value, if any.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the byte string, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteArray(b) => Some(b),
            _ => None,
        }
    }
}

/// Multi-signature request observed in the mempool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryRequest {
    /// Hash of the main transaction awaiting signatures.
    pub main_tx_hash: [u8; 32],
    /// Contract invoked by the main transaction.
    pub contract: ContractAddress,
    /// Invoked contract method.
    pub method: String,
    /// Invocation arguments in push order (last call argument first).
    pub args: Vec<StackItem>,
}

impl NotaryRequest {
    /// Returns the main transaction hash as hex.
    #[must_use]
    pub fn main_tx_hash_hex(&self) -> String {
        hex::encode(self.main_tx_hash)
    }
}

/// Decoded event handed to handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Reputation submission.
    ReputationPut(ReputationPutEvent),
}

impl Event {
    /// Returns the event kind.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::ReputationPut(_) => EventType::ReputationPut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_address_le_hex() {
        let mut bytes = [0u8; CONTRACT_ADDRESS_LEN];
        bytes[0] = 0xab;
        bytes[19] = 0x01;
        let addr = ContractAddress::new(bytes);

        let s = addr.to_le_hex();
        assert!(s.starts_with("01"));
        assert!(s.ends_with("ab"));

        let parsed: ContractAddress = s.parse().expect("address");
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_contract_address_invalid() {
        assert!(ContractAddress::from_le_hex("zz").is_err());
        assert_eq!(
            ContractAddress::from_le_hex("0102"),
            Err(ParseError::InvalidLength {
                field: "contract address",
                expected: CONTRACT_ADDRESS_LEN,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_peer_id_from_slice() {
        let key = [2u8; PEER_ID_LEN];
        let id = PeerId::from_slice("target", &key).expect("peer id");
        assert_eq!(id.public_key(), &key);

        let err = PeerId::from_slice("target", &key[..10]);
        assert!(err.is_err());
    }

    #[test]
    fn test_peer_id_serde() {
        let id = PeerId::new([3u8; PEER_ID_LEN]);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.to_hex()));

        let back: PeerId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(EventType::ReputationPut.notification_name(), "reputationPut");
        assert_eq!(EventType::ReputationPut.notary_method(), "put");
        assert_eq!(
            EventType::from_notification_name("reputationPut"),
            Some(EventType::ReputationPut)
        );
        assert_eq!(EventType::from_notification_name("containerPut"), None);
    }

    #[test]
    fn test_stack_item_accessors() {
        assert_eq!(StackItem::Integer(7).as_integer(), Some(7));
        assert_eq!(StackItem::Bool(true).as_integer(), None);
        assert_eq!(StackItem::ByteArray(vec![1]).as_bytes(), Some(&[1u8][..]));
        assert_eq!(StackItem::Null.kind(), "null");
    }
}
