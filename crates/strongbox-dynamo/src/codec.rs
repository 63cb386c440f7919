// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion between DynamoDB items and Strongbox attributes.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;
use strongbox_core::{
    AttributeValue, Attributes, Record, StrongboxError, PARTITION_KEY_ATTR, SORT_KEY_ATTR,
};

/// A raw DynamoDB item.
pub type Item = HashMap<String, DynamoValue>;

/// Build a full item from keys plus attributes.
pub fn to_item(partition_key: &str, sort_key: &str, attributes: Attributes) -> Item {
    let mut item: Item = attributes
        .into_iter()
        .map(|(name, value)| (name, to_dynamo(value)))
        .collect();
    item.insert(
        PARTITION_KEY_ATTR.to_string(),
        DynamoValue::S(partition_key.to_string()),
    );
    item.insert(
        SORT_KEY_ATTR.to_string(),
        DynamoValue::S(sort_key.to_string()),
    );
    item
}

/// Primary key for `get_item`.
pub fn key(partition_key: &str, sort_key: &str) -> Item {
    HashMap::from([
        (
            PARTITION_KEY_ATTR.to_string(),
            DynamoValue::S(partition_key.to_string()),
        ),
        (
            SORT_KEY_ATTR.to_string(),
            DynamoValue::S(sort_key.to_string()),
        ),
    ])
}

fn to_dynamo(value: AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::Str(s) => DynamoValue::S(s),
        AttributeValue::Num(n) => DynamoValue::N(n.to_string()),
    }
}

/// Decode an item into a [`Record`], splitting off the key attributes.
///
/// Attribute types other than `S` and `N`, non-integer numbers, or missing
/// keys make the record malformed.
pub fn from_item(item: &Item) -> Result<Record, StrongboxError> {
    let partition_key = string_key(item, PARTITION_KEY_ATTR, "?", "?")?;
    let sort_key = string_key(item, SORT_KEY_ATTR, &partition_key, "?")?;

    let mut attributes = Attributes::new();
    for (name, value) in item {
        if name == PARTITION_KEY_ATTR || name == SORT_KEY_ATTR {
            continue;
        }
        let decoded = match value {
            DynamoValue::S(s) => AttributeValue::Str(s.clone()),
            DynamoValue::N(n) => AttributeValue::Num(n.parse().map_err(|_| {
                malformed(&partition_key, &sort_key, format!("`{name}` is not an integer: {n}"))
            })?),
            _ => {
                return Err(malformed(
                    &partition_key,
                    &sort_key,
                    format!("`{name}` has an unsupported attribute type"),
                ));
            }
        };
        attributes.insert(name.clone(), decoded);
    }

    Ok(Record {
        partition_key,
        sort_key,
        attributes,
    })
}

fn string_key(
    item: &Item,
    name: &str,
    service: &str,
    sort_key: &str,
) -> Result<String, StrongboxError> {
    match item.get(name) {
        Some(DynamoValue::S(s)) => Ok(s.clone()),
        Some(_) => Err(malformed(service, sort_key, format!("`{name}` is not a string"))),
        None => Err(malformed(service, sort_key, format!("missing `{name}`"))),
    }
}

fn malformed(service: &str, sort_key: &str, reason: String) -> StrongboxError {
    StrongboxError::MalformedRecord {
        service: service.to_string(),
        sort_key: sort_key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_core::{PASSWORD_ATTR, VERSION_ATTR};

    fn current_attrs() -> Attributes {
        Attributes::from([
            (PASSWORD_ATTR.to_string(), AttributeValue::Str("00ff:abcd".into())),
            (VERSION_ATTR.to_string(), AttributeValue::Num(3)),
        ])
    }

    #[test]
    fn to_item_adds_keys_and_encodes_numbers_as_strings() {
        let item = to_item("db", "current", current_attrs());
        assert_eq!(item.get("pk"), Some(&DynamoValue::S("db".into())));
        assert_eq!(item.get("sk"), Some(&DynamoValue::S("current".into())));
        assert_eq!(item.get("version"), Some(&DynamoValue::N("3".into())));
        assert_eq!(item.len(), 4);
    }

    #[test]
    fn from_item_strips_keys() {
        let record = from_item(&to_item("db", "current", current_attrs())).unwrap();
        assert_eq!(record.partition_key, "db");
        assert_eq!(record.sort_key, "current");
        assert_eq!(record.attributes, current_attrs());
    }

    #[test]
    fn non_integer_number_is_malformed() {
        let mut item = key("db", "current");
        item.insert("version".into(), DynamoValue::N("1.5".into()));
        let err = from_item(&item).unwrap_err();
        assert!(matches!(err, StrongboxError::MalformedRecord { .. }));
    }

    #[test]
    fn unsupported_type_is_malformed() {
        let mut item = key("db", "version#1");
        item.insert("password".into(), DynamoValue::Bool(true));
        assert!(from_item(&item).is_err());
    }

    #[test]
    fn missing_sort_key_is_malformed() {
        let item = HashMap::from([("pk".to_string(), DynamoValue::S("db".into()))]);
        let err = from_item(&item).unwrap_err();
        assert!(err.to_string().contains("missing `sk`"), "got {err}");
    }
}
