//! Reputation contract events.
//!
//! Decoders for the `reputationPut` notification and the notary request
//! invoking the contract's `put` method. Both produce the same event.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::{Event, EventType, NotaryRequest, PeerId, StackItem};

/// Number of arguments carried by a put notification.
const PUT_ITEM_COUNT: usize = 4;

/// One peer's reputation submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationPutEvent {
    /// Epoch the trust value was computed for.
    pub epoch: u64,
    /// Peer that reported the value.
    pub reporter: PeerId,
    /// Peer the value is about.
    pub target: PeerId,
    /// Serialized trust value, opaque to the event layer.
    pub value: Vec<u8>,
    /// Originating notary request, for events delivered via the notary path.
    pub notary_request: Option<NotaryRequest>,
}

impl ReputationPutEvent {
    /// Returns true if the event was assembled from a notary request.
    #[must_use]
    pub const fn is_notary(&self) -> bool {
        self.notary_request.is_some()
    }

    /// Returns the stack items of the equivalent contract notification.
    #[must_use]
    pub fn to_stack_items(&self) -> Vec<StackItem> {
        vec![
            StackItem::Integer(i128::from(self.epoch)),
            StackItem::ByteArray(self.reporter.public_key().to_vec()),
            StackItem::ByteArray(self.target.public_key().to_vec()),
            StackItem::ByteArray(self.value.clone()),
        ]
    }
}

/// Decodes a `reputationPut` notification.
///
/// # Errors
///
/// Returns an error unless the items are `[epoch, reporter, target, value]`.
pub fn parse_put(items: &[StackItem]) -> Result<Event, ParseError> {
    decode_put(items, None).map(Event::ReputationPut)
}

/// Decodes a notary request invoking the reputation contract's `put` method.
///
/// # Errors
///
/// Returns an error if the method is not `put` or the arguments are malformed.
pub fn parse_put_notary(request: &NotaryRequest) -> Result<Event, ParseError> {
    let expected = EventType::ReputationPut.notary_method();
    if request.method != expected {
        return Err(ParseError::UnexpectedMethod {
            expected,
            actual: request.method.clone(),
        });
    }

    // arguments are pushed last-first
    let args: Vec<StackItem> = request.args.iter().rev().cloned().collect();
    decode_put(&args, Some(request.clone())).map(Event::ReputationPut)
}

fn decode_put(
    items: &[StackItem],
    notary_request: Option<NotaryRequest>,
) -> Result<ReputationPutEvent, ParseError> {
    let [epoch, reporter, target, value] = items else {
        return Err(ParseError::WrongItemCount {
            expected: PUT_ITEM_COUNT,
            actual: items.len(),
        });
    };

    Ok(ReputationPutEvent {
        epoch: decode_epoch(epoch)?,
        reporter: PeerId::from_slice("reporter", bytes_of("reporter", reporter)?)?,
        target: PeerId::from_slice("target", bytes_of("target", target)?)?,
        value: bytes_of("value", value)?.to_vec(),
        notary_request,
    })
}

fn decode_epoch(item: &StackItem) -> Result<u64, ParseError> {
    let raw = item.as_integer().ok_or(ParseError::UnexpectedItem {
        field: "epoch",
        expected: "integer",
        actual: item.kind(),
    })?;
    u64::try_from(raw).map_err(|_| ParseError::OutOfRange {
        field: "epoch",
        value: raw,
    })
}

fn bytes_of<'a>(field: &'static str, item: &'a StackItem) -> Result<&'a [u8], ParseError> {
    item.as_bytes().ok_or(ParseError::UnexpectedItem {
        field,
        expected: "byte array",
        actual: item.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractAddress, PEER_ID_LEN};

    fn put_items() -> Vec<StackItem> {
        vec![
            StackItem::Integer(10),
            StackItem::ByteArray(vec![2u8; PEER_ID_LEN]),
            StackItem::ByteArray(vec![3u8; PEER_ID_LEN]),
            StackItem::ByteArray(0.7f64.to_be_bytes().to_vec()),
        ]
    }

    #[test]
    fn test_parse_put() {
        let Event::ReputationPut(put) = parse_put(&put_items()).expect("put");

        assert_eq!(put.epoch, 10);
        assert_eq!(put.reporter, PeerId::new([2u8; PEER_ID_LEN]));
        assert_eq!(put.target, PeerId::new([3u8; PEER_ID_LEN]));
        assert_eq!(put.value, 0.7f64.to_be_bytes().to_vec());
        assert!(!put.is_notary());
        assert_eq!(put.to_stack_items(), put_items());
    }

    #[test]
    fn test_parse_put_wrong_count() {
        let mut items = put_items();
        items.pop();

        assert_eq!(
            parse_put(&items),
            Err(ParseError::WrongItemCount {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_parse_put_negative_epoch() {
        let mut items = put_items();
        items[0] = StackItem::Integer(-1);

        assert!(matches!(
            parse_put(&items),
            Err(ParseError::OutOfRange { field: "epoch", .. })
        ));
    }

    #[test]
    fn test_parse_put_bad_target() {
        let mut items = put_items();
        items[2] = StackItem::ByteArray(vec![1, 2, 3]);

        assert_eq!(
            parse_put(&items),
            Err(ParseError::InvalidLength {
                field: "target",
                expected: PEER_ID_LEN,
                actual: 3
            })
        );

        items[2] = StackItem::Bool(true);
        assert!(matches!(
            parse_put(&items),
            Err(ParseError::UnexpectedItem { field: "target", .. })
        ));
    }

    #[test]
    fn test_parse_put_notary() {
        let mut args = put_items();
        args.reverse();
        let request = NotaryRequest {
            main_tx_hash: [9u8; 32],
            contract: ContractAddress::new([1u8; 20]),
            method: "put".to_string(),
            args,
        };

        let Event::ReputationPut(put) = parse_put_notary(&request).expect("put");

        assert_eq!(put.epoch, 10);
        assert_eq!(put.reporter, PeerId::new([2u8; PEER_ID_LEN]));
        assert!(put.is_notary());
        assert_eq!(put.notary_request, Some(request));
    }

    #[test]
    fn test_parse_put_notary_wrong_method() {
        let request = NotaryRequest {
            main_tx_hash: [0u8; 32],
            contract: ContractAddress::default(),
            method: "delete".to_string(),
            args: put_items(),
        };

        assert!(matches!(
            parse_put_notary(&request),
            Err(ParseError::UnexpectedMethod { .. })
        ));
    }
}
