//! Conversion between DynamoDB attribute values and serde models.
//!
//! Records are converted through `serde_json::Value` so the stored item
//! layout is exactly the camelCase JSON shape of [`TenantRecord`].

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::domain::TenantRecord;

pub(super) type Item = HashMap<String, AttributeValue>;

pub(super) fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), to_attribute(field)))
                .collect(),
        ),
    }
}

fn parse_number(raw: &str) -> Result<Number, String> {
    if let Ok(integer) = raw.parse::<i64>() {
        return Ok(Number::from(integer));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("invalid number attribute {raw:?}"))
}

pub(super) fn from_attribute(value: &AttributeValue) -> Result<Value, String> {
    Ok(match value {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::N(raw) => Value::Number(parse_number(raw)?),
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::L(values) => {
            Value::Array(values.iter().map(from_attribute).collect::<Result<_, _>>()?)
        }
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), from_attribute(field)?)))
                .collect::<Result<Map<_, _>, String>>()?,
        ),
        other => return Err(format!("unsupported attribute type {other:?}")),
    })
}

/// Encode any serialisable model as an attribute value.
pub(super) fn encode<T: Serialize>(model: &T) -> Result<AttributeValue, String> {
    serde_json::to_value(model)
        .map(|value| to_attribute(&value))
        .map_err(|error| error.to_string())
}

pub(super) fn record_to_item(record: &TenantRecord) -> Result<Item, String> {
    match encode(record)? {
        AttributeValue::M(fields) => Ok(fields),
        _ => Err("tenant record did not encode as a map".to_owned()),
    }
}

pub(super) fn item_to_record(item: &Item) -> Result<TenantRecord, String> {
    decode(&AttributeValue::M(item.clone()))
}

fn decode<T: DeserializeOwned>(value: &AttributeValue) -> Result<T, String> {
    serde_json::from_value(from_attribute(value)?).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Section, SectionContent, SectionKind, TenantId};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn records_survive_the_item_layout() {
        let mut record = TenantRecord::provisioned(TenantId::new(3), 1_700_000_000_000);
        record.environments.dev.website.insert(
            "gallery".into(),
            Section::try_new(
                "gallery",
                SectionKind::Container,
                SectionContent::Images(vec!["a.png".into(), String::new()]),
            )
            .expect("valid"),
        );

        let item = record_to_item(&record).expect("encodes");

        assert_eq!(item.get("clientId"), Some(&AttributeValue::N("3".into())));
        assert_eq!(item_to_record(&item).expect("decodes"), record);
    }

    #[rstest]
    #[case(json!(null), AttributeValue::Null(true))]
    #[case(json!(true), AttributeValue::Bool(true))]
    #[case(json!(12), AttributeValue::N("12".into()))]
    #[case(json!("hi"), AttributeValue::S("hi".into()))]
    fn scalars_map_to_native_attributes(#[case] value: Value, #[case] expected: AttributeValue) {
        assert_eq!(to_attribute(&value), expected);
    }

    #[rstest]
    fn string_sets_decode_as_arrays() {
        let value = from_attribute(&AttributeValue::Ss(vec!["a".into(), "b".into()]))
            .expect("decodes");
        assert_eq!(value, json!(["a", "b"]));
    }

    #[rstest]
    fn binary_attributes_are_rejected() {
        let error = from_attribute(&AttributeValue::B(aws_sdk_dynamodb::primitives::Blob::new(
            vec![1],
        )))
        .expect_err("binary is unsupported");
        assert!(error.contains("unsupported"));
    }

    #[rstest]
    fn malformed_numbers_are_rejected() {
        assert!(from_attribute(&AttributeValue::N("1e".into())).is_err());
    }
}
