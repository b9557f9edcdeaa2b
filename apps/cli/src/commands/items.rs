//! Shopping list item commands (child accounts).

use super::lists::print_list;
use crate::output::{self, OutputFormat};
use allowance_api::{AllowanceClient, ShoppingListItem};
use anyhow::{Context, Result};
use base64::Engine;
use std::path::Path;

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

pub async fn items_add(
    client: &AllowanceClient,
    list_id: &str,
    name: &str,
    format: &OutputFormat,
) -> Result<()> {
    let item = client.add_item(list_id, name).await?;
    print_item(&item, format);
    Ok(())
}

pub async fn items_update(
    client: &AllowanceClient,
    list_id: &str,
    item_id: &str,
    name: &str,
    price: Option<f64>,
    format: &OutputFormat,
) -> Result<()> {
    let item = client.update_item(list_id, item_id, name, price).await?;
    print_item(&item, format);
    Ok(())
}

pub async fn items_delete(
    client: &AllowanceClient,
    list_id: &str,
    item_id: &str,
    format: &OutputFormat,
) -> Result<()> {
    client.delete_item(list_id, item_id).await?;
    output::print_success(&format!("Deleted item {}", item_id), format);
    Ok(())
}

pub async fn items_complete(
    client: &AllowanceClient,
    list_id: &str,
    item_id: &str,
    price: f64,
    format: &OutputFormat,
) -> Result<()> {
    let list = client.complete_item(list_id, item_id, price).await?;
    print_list(&list, format);
    Ok(())
}

/// Upload a photo of the price tag and print the match result.
pub async fn items_verify(
    client: &AllowanceClient,
    list_id: &str,
    item_id: &str,
    image: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("could not read {}", image.display()))?;
    let result = client
        .verify_item(list_id, item_id, &BASE64.encode(bytes))
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&result),
        OutputFormat::Text => {
            let verdict = if result.is_match { "Match" } else { "No match" };
            output::print_heading(verdict);
            output::print_row("Confidence", &format!("{:.0}%", result.confidence * 100.0));
            if let Some(price) = result.extracted_price_value() {
                output::print_row("Extracted price", &output::money(price));
            }
            if !result.message.is_empty() {
                output::print_row("Message", &result.message);
            }
        }
    }
    Ok(())
}

fn print_item(item: &ShoppingListItem, format: &OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(item),
        OutputFormat::Text => {
            output::print_heading(&item.name);
            output::print_row("ID", &item.id);
            let price = item.price.map(output::money).unwrap_or_else(|| "-".into());
            output::print_row("Price", &price);
            output::print_row("Completed", if item.is_completed { "yes" } else { "no" });
        }
    }
}
