//! Query ids decode back to the request they were issued for.

use playlog::error::ApiError;
use playlog::query::{decode, encode, AggregationKind, AggregationRequest};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn kind_strategy() -> impl Strategy<Value = AggregationKind> {
    prop_oneof![
        Just(AggregationKind::Sum),
        Just(AggregationKind::Avg),
        Just(AggregationKind::Count),
    ]
}

fn query_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![1 => Just(Value::Null), 4 => field_query_strategy()]
}

fn field_query_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}(\\.[a-zA-Z]{1,6}){0,2}", any::<i64>(), 0..4).prop_map(
        |fields| {
            let object: Map<String, Value> = fields
                .into_iter()
                .map(|(path, n)| {
                    let mut op = Map::new();
                    op.insert("$gte".to_string(), Value::from(n));
                    (path, Value::Object(op))
                })
                .collect();
            Value::Object(object)
        },
    )
}

#[test]
fn test_decode_inverts_encode() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                kind_strategy(),
                proptest::option::of("[a-z]{1,6}(\\.[a-z]{1,6}){0,2}"),
                query_strategy(),
            ),
            |(kind, key, query)| {
                let key = if kind == AggregationKind::Count {
                    key
                } else {
                    Some(key.unwrap_or_else(|| "duration".to_string()))
                };
                let request = AggregationRequest::new(kind, key, query).unwrap();
                let token = encode(&request).unwrap();
                prop_assert_eq!(decode(&token).unwrap(), request);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_non_base64_tokens_are_malformed() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&"[A-Za-z0-9+/]{0,40}", |prefix| {
            let token = format!("{}!", prefix);
            prop_assert!(matches!(
                decode(&token),
                Err(ApiError::MalformedQueryToken(_))
            ));
            Ok(())
        })
        .unwrap();
}
