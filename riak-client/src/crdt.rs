//! User-facing CRDT values and update operations.
//!
//! Riak's data types are fetched and updated through opaque causal
//! contexts: a fetch may carry a `context`, and any update that removes
//! elements must echo the most recent context observed. The result types
//! here surface that context so callers can carry it forward.

use bytes::Bytes;
use riak_core::protocol::messages::{CounterOp, DataType, DtFetchResp, DtUpdateResp, MapEntry, SetOp};
use riak_core::{Result, RiakError};

/// A fetched or updated CRDT counter.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterResult {
    /// The counter value. Absent on updates without `return_body`.
    pub value: Option<i64>,
    /// Causal context to echo on later updates, when requested.
    pub context: Option<Bytes>,
}

/// A fetched or updated CRDT set.
#[derive(Debug, Clone, PartialEq)]
pub struct SetResult {
    /// The set members. Empty on updates without `return_body`.
    pub members: Vec<Bytes>,
    /// Causal context to echo on later updates, when requested.
    pub context: Option<Bytes>,
}

/// A fetched or updated CRDT map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapResult {
    /// The map entries, keyed by `(name, kind)`.
    pub entries: Vec<MapEntry>,
    /// Causal context to echo on later updates, when requested.
    pub context: Option<Bytes>,
}

/// Changes to apply to a CRDT set in one update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetUpdate {
    /// Elements to add.
    pub adds: Vec<Bytes>,
    /// Elements to remove. Removals require an echoed context.
    pub removes: Vec<Bytes>,
}

impl SetUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element.
    pub fn add(mut self, element: impl Into<Bytes>) -> Self {
        self.adds.push(element.into());
        self
    }

    /// Removes an element.
    pub fn remove(mut self, element: impl Into<Bytes>) -> Self {
        self.removes.push(element.into());
        self
    }

    /// Returns `true` when the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }

    /// Returns `true` when the update removes elements and therefore
    /// requires an echoed context.
    pub fn has_removes(&self) -> bool {
        !self.removes.is_empty()
    }

    pub(crate) fn into_op(self) -> SetOp {
        SetOp {
            adds: self.adds,
            removes: self.removes,
        }
    }
}

/// Extracts a counter from a CRDT fetch response.
///
/// An absent value materializes as not-found, matching the object path's
/// treatment of an absent causal vector.
pub(crate) fn counter_from_fetch(resp: DtFetchResp) -> Result<CounterResult> {
    let value = resp.value.ok_or(RiakError::NotFound)?;
    expect_type(resp.data_type, DataType::Counter)?;
    Ok(CounterResult {
        value: Some(value.counter_value.unwrap_or(0)),
        context: resp.context,
    })
}

/// Extracts a set from a CRDT fetch response.
pub(crate) fn set_from_fetch(resp: DtFetchResp) -> Result<SetResult> {
    let value = resp.value.ok_or(RiakError::NotFound)?;
    expect_type(resp.data_type, DataType::Set)?;
    Ok(SetResult {
        members: value.set_value,
        context: resp.context,
    })
}

/// Extracts a map from a CRDT fetch response.
pub(crate) fn map_from_fetch(resp: DtFetchResp) -> Result<MapResult> {
    let value = resp.value.ok_or(RiakError::NotFound)?;
    expect_type(resp.data_type, DataType::Map)?;
    Ok(MapResult {
        entries: value.map_value,
        context: resp.context,
    })
}

fn expect_type(wire: i32, expected: DataType) -> Result<()> {
    if wire == expected as i32 {
        Ok(())
    } else {
        Err(RiakError::InvalidResponse(format!(
            "expected {:?} data type, server reported {}",
            expected, wire
        )))
    }
}

pub(crate) fn counter_from_update(resp: DtUpdateResp) -> CounterResult {
    CounterResult {
        value: resp.counter_value,
        context: resp.context,
    }
}

pub(crate) fn set_from_update(resp: DtUpdateResp) -> SetResult {
    SetResult {
        members: resp.set_value,
        context: resp.context,
    }
}

pub(crate) fn map_from_update(resp: DtUpdateResp) -> MapResult {
    MapResult {
        entries: resp.map_value,
        context: resp.context,
    }
}

pub(crate) fn counter_op(increment: i64) -> CounterOp {
    CounterOp {
        increment: Some(increment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riak_core::protocol::messages::{DtValue, MapField, MapFieldType};

    #[test]
    fn test_counter_fetch_present() {
        let resp = DtFetchResp {
            context: Some(Bytes::from_static(b"c")),
            data_type: DataType::Counter as i32,
            value: Some(DtValue {
                counter_value: Some(12),
                ..Default::default()
            }),
        };

        let counter = counter_from_fetch(resp).unwrap();
        assert_eq!(counter.value, Some(12));
        assert_eq!(counter.context, Some(Bytes::from_static(b"c")));
    }

    #[test]
    fn test_counter_fetch_absent_is_not_found() {
        let resp = DtFetchResp {
            context: None,
            data_type: DataType::Counter as i32,
            value: None,
        };

        let err = counter_from_fetch(resp).unwrap_err();
        assert!(matches!(err, RiakError::NotFound));
    }

    #[test]
    fn test_fetch_type_mismatch_is_invalid_response() {
        let resp = DtFetchResp {
            context: None,
            data_type: DataType::Set as i32,
            value: Some(DtValue::default()),
        };

        let err = counter_from_fetch(resp).unwrap_err();
        assert!(matches!(err, RiakError::InvalidResponse(_)));
    }

    #[test]
    fn test_set_fetch_members() {
        let resp = DtFetchResp {
            context: Some(Bytes::from_static(b"ctx")),
            data_type: DataType::Set as i32,
            value: Some(DtValue {
                set_value: vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")],
                ..Default::default()
            }),
        };

        let set = set_from_fetch(resp).unwrap();
        assert_eq!(set.members.len(), 2);
        assert_eq!(set.context, Some(Bytes::from_static(b"ctx")));
    }

    #[test]
    fn test_map_fetch_entries() {
        let resp = DtFetchResp {
            context: None,
            data_type: DataType::Map as i32,
            value: Some(DtValue {
                map_value: vec![MapEntry {
                    field: Some(MapField {
                        name: Bytes::from_static(b"visits"),
                        field_type: MapFieldType::Counter as i32,
                    }),
                    counter_value: Some(3),
                    ..Default::default()
                }],
                ..Default::default()
            }),
        };

        let map = map_from_fetch(resp).unwrap();
        assert_eq!(map.entries.len(), 1);
        assert_eq!(map.entries[0].counter_value, Some(3));
    }

    #[test]
    fn test_set_update_builder() {
        let update = SetUpdate::new().add("x").add("y").remove("z");
        assert!(!update.is_empty());
        assert!(update.has_removes());

        let op = update.into_op();
        assert_eq!(op.adds.len(), 2);
        assert_eq!(op.removes.len(), 1);
    }

    #[test]
    fn test_update_result_mapping() {
        let resp = DtUpdateResp {
            key: None,
            context: Some(Bytes::from_static(b"new-ctx")),
            counter_value: Some(5),
            set_value: vec![],
            map_value: vec![],
        };

        let counter = counter_from_update(resp);
        assert_eq!(counter.value, Some(5));
        assert_eq!(counter.context, Some(Bytes::from_static(b"new-ctx")));
    }
}
