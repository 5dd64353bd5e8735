use serde_json::Value;
use std::io;

use super::{cell, find_rows, flatten, payload};

/// Write output as CSV to stdout.
///
/// Record lists (installments, loans) become one row per record; anything
/// else is written as `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = find_rows(value) {
        write_rows(&mut wtr, rows);
    } else if let Value::Object(map) = payload(value) {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in flatten(map) {
            let _ = wtr.write_record([key, val]);
        }
    } else {
        let _ = wtr.write_record([cell(value)]);
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);

    for item in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(cell).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}
