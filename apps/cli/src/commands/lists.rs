//! Shopping list commands.

use crate::output::{self, OutputFormat};
use allowance_api::{AllowanceClient, ListBucket, ListType, ShoppingList};
use anyhow::Result;

pub async fn lists_create(
    client: &AllowanceClient,
    title: &str,
    list_type: ListType,
    format: &OutputFormat,
) -> Result<()> {
    let list = client.create_shopping_list(title, list_type).await?;
    print_list(&list, format);
    Ok(())
}

/// The signed-in child's lists in `bucket`.
pub async fn lists_mine(
    client: &AllowanceClient,
    bucket: ListBucket,
    format: &OutputFormat,
) -> Result<()> {
    let lists = client.my_lists(bucket).await?;
    print_lists(&lists, format);
    Ok(())
}

pub async fn lists_rename(
    client: &AllowanceClient,
    id: &str,
    title: &str,
    format: &OutputFormat,
) -> Result<()> {
    let list = client.update_list_title(id, title).await?;
    print_list(&list, format);
    Ok(())
}

pub async fn lists_submit(client: &AllowanceClient, id: &str, format: &OutputFormat) -> Result<()> {
    let list = client.submit_list(id).await?;
    print_list(&list, format);
    Ok(())
}

pub async fn lists_delete(client: &AllowanceClient, id: &str, format: &OutputFormat) -> Result<()> {
    client.delete_list(id).await?;
    output::print_success(&format!("Deleted list {}", id), format);
    Ok(())
}

pub async fn lists_approve(client: &AllowanceClient, id: &str, format: &OutputFormat) -> Result<()> {
    let list = client.approve_list(id).await?;
    print_list(&list, format);
    Ok(())
}

pub async fn lists_reject(client: &AllowanceClient, id: &str, format: &OutputFormat) -> Result<()> {
    let list = client.reject_list(id).await?;
    print_list(&list, format);
    Ok(())
}

pub async fn lists_child_active(
    client: &AllowanceClient,
    child_id: &str,
    format: &OutputFormat,
) -> Result<()> {
    let lists = client.child_active_lists(child_id).await?;
    print_lists(&lists, format);
    Ok(())
}

pub async fn lists_child_pending(
    client: &AllowanceClient,
    child_id: &str,
    format: &OutputFormat,
) -> Result<()> {
    let lists = client.child_pending_lists(child_id).await?;
    print_lists(&lists, format);
    Ok(())
}

fn print_lists(lists: &[ShoppingList], format: &OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(&lists),
        OutputFormat::Text => {
            if lists.is_empty() {
                println!("No lists found");
                return;
            }
            println!(
                "{:<36} {:<24} {:<10} {:<9} {:>8} {:>6}",
                "ID", "Title", "Type", "Status", "Total", "Items"
            );
            output::print_divider();
            for list in lists {
                println!(
                    "{:<36} {:<24} {:<10} {:<9} {:>8} {:>6}",
                    list.id,
                    list.title,
                    list.list_type.to_string(),
                    list.status.to_string(),
                    output::money(list.total_cost),
                    format!("{}/{}", list.completed_items(), list.items.len())
                );
            }
        }
    }
}

pub(super) fn print_list(list: &ShoppingList, format: &OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(list),
        OutputFormat::Text => {
            output::print_heading(&list.title);
            output::print_row("ID", &list.id);
            output::print_row("Type", &list.list_type.to_string());
            output::print_row("Status", &list.status.to_string());
            output::print_row("Total", &output::money(list.total_cost));
            let created = list
                .created_at_utc()
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| list.created_at.clone());
            output::print_row("Created", &created);
            for item in &list.items {
                let mark = if item.is_completed { "x" } else { " " };
                let price = item.price.map(output::money).unwrap_or_else(|| "-".into());
                println!("  [{}] {:<32} {:>8}  {}", mark, item.name, price, item.id);
            }
        }
    }
}
