use serde_json::{Value, json};

/// A report with one parameter of each kind the binder treats differently.
pub fn sales_definition() -> Value {
    json!({
        "name": "sales",
        "parameters": [
            { "name": "title", "type": "string", "default": "Quarterly sales" },
            { "name": "region", "type": "string", "multiSelect": true },
            { "name": "year", "type": "integer" },
            { "name": "ids", "type": "integer", "array": true },
            { "name": "since", "type": "date" },
            { "name": "owner", "type": "string", "defaultFromEnvironment": "user.name" }
        ]
    })
}

/// A report that insists on being rendered as `preferred`.
pub fn locked_definition(preferred: &str) -> Value {
    json!({
        "name": "locked",
        "attributes": {
            "urn:reportflow:core": {
                "preferred-output-type": preferred,
                "lock-preferred-output-type": true
            }
        },
        "parameters": []
    })
}

pub fn to_bytes(definition: &Value) -> Vec<u8> {
    serde_json::to_vec(definition).unwrap_or_default()
}
