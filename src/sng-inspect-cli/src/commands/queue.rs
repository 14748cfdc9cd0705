//! `dump-queue` handler

use anyhow::{anyhow, Context, Result};
use sng_inspect::{dump_queue, Address, Cancellation, FieldValue, StaticField, Target};

use crate::session::parse_address;

/// Handle the dump-queue command
pub fn handle_dump_queue(
    target: &Target<'_>,
    queue: &str,
    field: &str,
    cancel: &Cancellation,
) -> Result<()> {
    let field = StaticField::from_name(field).ok_or_else(|| {
        let known: Vec<&str> = StaticField::ALL.iter().map(|f| f.name()).collect();
        anyhow!("Unknown field {:?}; expected one of {}", field, known.join(", "))
    })?;
    let queue = Address::new(parse_address(queue)?);

    let values = dump_queue(target, queue, field, cancel)
        .with_context(|| format!("Failed to dump queue at {}", queue))?;

    println!("{}", render_queue(&values, field)?);
    Ok(())
}

/// Render one decoded value, using markers for unset and indirect values
pub fn render_value(value: &FieldValue, field: StaticField) -> String {
    match value {
        FieldValue::Direct(text) => text.clone(),
        FieldValue::Unset => format!("[Empty {}]", field),
        FieldValue::Indirect => format!("[Indirect {}] - Not implemented", field),
    }
}

/// JSON array of rendered values with two-space indentation
pub fn render_queue(values: &[FieldValue], field: StaticField) -> Result<String> {
    let rendered: Vec<String> = values.iter().map(|v| render_value(v, field)).collect();
    serde_json::to_string_pretty(&rendered).context("Failed to serialize queue")
}
