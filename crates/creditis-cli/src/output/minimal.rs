use serde_json::Value;

use super::{cell, payload};

/// Fields worth printing on their own, most specific first.
const KEY_FIELDS: [&str; 6] = [
    "monthly_payment",
    "receipt_number",
    "remaining_balance",
    "amount_outstanding",
    "total_outstanding",
    "installment_amount",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(payload(value)));
}

fn minimal_line(value: &Value) -> String {
    let Value::Object(map) = value else {
        return cell(value);
    };

    if let Some(val) = KEY_FIELDS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
    {
        return cell(val);
    }

    match map.iter().next() {
        Some((key, val)) => format!("{key}: {}", cell(val)),
        None => String::new(),
    }
}
