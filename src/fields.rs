//! Zipping payloads against the column header
//!
//! Both the header and every payload are comma-separated with no quoting, so a
//! payload maps onto the columns only when the two split counts agree.

use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;

/// Column name → value pairs for one record, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, String)>,
}

impl Fields {
    /// Value for `column`. With duplicate column names the last one wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into an unordered map.
    pub fn into_map(self) -> HashMap<String, String> {
        self.entries.into_iter().collect()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Outcome of a field lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup {
    /// A range matched and its payload lines up with the header
    Found(Fields),
    /// No range contains the address
    NotFound,
    /// A range matched but its field count differs from the header's
    ColumnMismatch {
        /// Number of header columns
        columns: usize,
        /// Number of payload values
        values: usize,
    },
}

impl FieldLookup {
    /// The fields, or an empty map for `NotFound` and `ColumnMismatch`.
    pub fn into_map(self) -> HashMap<String, String> {
        match self {
            FieldLookup::Found(fields) => fields.into_map(),
            FieldLookup::NotFound | FieldLookup::ColumnMismatch { .. } => HashMap::new(),
        }
    }
}

/// Zip `payload` against `header`.
pub fn map_fields(header: &str, payload: &str) -> FieldLookup {
    let columns: Vec<&str> = header.split(',').collect();
    let values: Vec<&str> = payload.split(',').collect();
    if columns.len() != values.len() {
        return FieldLookup::ColumnMismatch {
            columns: columns.len(),
            values: values.len(),
        };
    }
    FieldLookup::Found(Fields {
        entries: columns
            .into_iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip() {
        let FieldLookup::Found(fields) = map_fields("name,val", "B,2") else {
            panic!("expected a match");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("name"), Some("B"));
        assert_eq!(fields.get("val"), Some("2"));
        assert_eq!(fields.get("missing"), None);
        assert_eq!(
            fields.iter().collect::<Vec<_>>(),
            vec![("name", "B"), ("val", "2")]
        );
    }

    #[test]
    fn test_mismatch() {
        assert_eq!(
            map_fields("name,val", "B,2,extra"),
            FieldLookup::ColumnMismatch {
                columns: 2,
                values: 3
            }
        );
        assert!(map_fields("a,b,c", "x").into_map().is_empty());
    }

    #[test]
    fn test_empty_values_are_kept() {
        let map = map_fields("country,city", "US,").into_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["city"], "");
    }

    #[test]
    fn test_empty_payload_single_column() {
        // "" splits into one empty field, matching a one-column header
        let map = map_fields("note", "").into_map();
        assert_eq!(map.get("note").map(String::as_str), Some(""));
    }

    #[test]
    fn test_serialize_in_header_order() {
        let FieldLookup::Found(fields) = map_fields("z,a,m", "1,2,3") else {
            panic!("expected a match");
        };
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"z":"1","a":"2","m":"3"}"#
        );
    }

    #[test]
    fn test_duplicate_columns_last_wins() {
        let FieldLookup::Found(fields) = map_fields("k,k", "first,second") else {
            panic!("expected a match");
        };
        assert_eq!(fields.get("k"), Some("second"));
        assert_eq!(fields.into_map()["k"], "second");
    }
}
