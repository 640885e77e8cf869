//! Cache wire-format guarantees: key casing and field omission rules are
//! consumed by downstream readers and must not drift.

use candela_types::{Audit, Candle, Coin, MarketSnapshot, SymbolSeries};
use serde_json::{json, Value};

fn candle() -> Candle {
    Candle {
        open_time: 1_700_000_000_000,
        close_time: 1_700_003_599_999,
        open_price: 100.0,
        high_price: 110.0,
        low_price: 90.0,
        close_price: 105.0,
        volume: 5000.0,
        volume_delta: Some(1000.0),
        open_interest: None,
        funding_rate: None,
    }
}

#[test]
fn candle_keys_are_camel_case_and_side_fields_are_omitted_when_absent() {
    let value = serde_json::to_value(candle()).unwrap();
    let obj = value.as_object().unwrap();

    assert_eq!(obj["openTime"], json!(1_700_000_000_000_i64));
    assert_eq!(obj["closePrice"], json!(105.0));
    assert_eq!(obj["volumeDelta"], json!(1000.0));
    // Never-observed side series leave no key behind.
    assert!(!obj.contains_key("openInterest"));
    assert!(!obj.contains_key("fundingRate"));
}

#[test]
fn unknowable_volume_delta_serializes_as_null() {
    let mut c = candle();
    c.volume_delta = None;
    c.open_interest = Some(81_000.5);

    let value = serde_json::to_value(c).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj["volumeDelta"], Value::Null);
    assert_eq!(obj["openInterest"], json!(81_000.5));
}

#[test]
fn snapshot_roots_are_camel_case_and_audit_keys_are_snake_case() {
    let snapshot = MarketSnapshot {
        timeframe: "4h".to_string(),
        open_time: 1_700_000_000_000,
        close_time: 1_700_014_399_999,
        data: vec![SymbolSeries {
            symbol: "BTCUSDT".to_string(),
            data: vec![candle()],
            exchanges: vec!["binance".to_string()],
        }],
        audit: Audit {
            timestamp: 1_700_014_400_123,
            source: "candela-collector".to_string(),
            symbols_in_final_list: 1,
        },
    };

    let value = serde_json::to_value(&snapshot).unwrap();
    let obj = value.as_object().unwrap();
    assert!(obj.contains_key("openTime"));
    assert!(obj.contains_key("closeTime"));

    let audit = obj["audit"].as_object().unwrap();
    assert!(audit.contains_key("symbols_in_final_list"));
    assert_eq!(audit["source"], json!("candela-collector"));

    let roundtrip: MarketSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(roundtrip, snapshot);
}

#[test]
fn coin_deserializes_with_missing_optional_fields() {
    let coin: Coin = serde_json::from_value(json!({ "symbol": "SOLUSDT" })).unwrap();
    assert_eq!(coin.symbol, "SOLUSDT");
    assert!(coin.exchanges.is_empty());
    assert!(coin.category.is_none());

    let coin: Coin = serde_json::from_value(json!({
        "symbol": "ETHUSDT",
        "exchanges": ["binance", "bybit"],
        "category": "layer-1"
    }))
    .unwrap();
    assert!(coin.lists("bybit"));
}
