use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::investease::InvestEaseError;

/// Output a success message and the upstream payload in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "message": message,
                "data": data
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if !data.is_null() {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Machine-readable code for an error surfaced by a command
pub fn error_code(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<InvestEaseError>()? {
        InvestEaseError::Invalid(_) => Some("INVALID_INPUT".to_string()),
        InvestEaseError::Api { status, .. } => Some(format!("HTTP_{}", status)),
        InvestEaseError::NotConfigured => Some("NOT_CONFIGURED".to_string()),
        InvestEaseError::Url(_) => Some("INVALID_URL".to_string()),
        InvestEaseError::Transport(_) => Some("TRANSPORT".to_string()),
    }
}

/// Output a collection, one line per item in text mode
pub fn output_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    items: Value,
    line: impl Fn(&Value) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: items }))?);
        }
        OutputFormat::Text => match items.as_array() {
            Some(list) if list.is_empty() => println!("No {} found", collection_name),
            Some(list) => {
                for item in list {
                    println!("{}", line(item));
                }
            }
            None => println!("{}", serde_json::to_string_pretty(&items)?),
        },
    }
    Ok(())
}

/// String field of an upstream record, or `-`
pub fn field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("-")
}
