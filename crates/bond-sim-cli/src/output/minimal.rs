use serde_json::Value;

/// Fields that carry the headline answer, most specific first. Nested
/// fields are addressed with a dotted path.
const PRIORITY_PATHS: [&str; 10] = [
    "price",
    "estimated_price",
    "new_price",
    "required_rate",
    "latest.close",
    "macaulay_duration",
    "coupon",
    "file_name",
    "count",
    "yield_rate",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(_) = result_obj {
        for path in &PRIORITY_PATHS {
            if let Some(val) = lookup(result_obj, path) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = result_obj.as_object().and_then(|m| m.iter().next()) {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_path() {
        let v = json!({ "latest": { "close": "4.27" } });
        assert_eq!(lookup(&v, "latest.close"), Some(&json!("4.27")));
        assert_eq!(lookup(&v, "latest.open"), None);
    }
}
