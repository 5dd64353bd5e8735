use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, flatten};

/// Summary fields as a two-column table, then every array of records
/// (installments, loans) as its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            print_fields(body);
            print_nested_rows(body);

            if let Some(Value::Array(warnings)) = map.get("warnings") {
                if !warnings.is_empty() {
                    println!("\nWarnings:");
                    for w in warnings.iter().filter_map(Value::as_str) {
                        println!("  - {w}");
                    }
                }
            }
            if let Some(Value::String(meth)) = map.get("methodology") {
                println!("\nMethodology: {meth}");
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{value}"),
    }
}

fn print_fields(map: &Map<String, Value>) {
    let fields = flatten(map);
    if fields.is_empty() {
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

fn print_nested_rows(map: &Map<String, Value>) {
    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
                println!("\n{key}:");
                print_rows(arr);
            }
            Value::Object(inner) => print_nested_rows(inner),
            _ => {}
        }
    }
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        if arr.is_empty() {
            println!("(empty)");
        }
        for item in arr {
            println!("{}", cell(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| item.get(h).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}
