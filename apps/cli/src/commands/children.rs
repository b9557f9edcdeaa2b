//! Child management commands (parent accounts).

use super::prompt_password;
use crate::output::{self, OutputFormat};
use allowance_api::{AllowanceClient, Child, CreateChildRequest};
use anyhow::Result;

pub async fn children_list(client: &AllowanceClient, format: &OutputFormat) -> Result<()> {
    let children = client.list_children().await?;

    match format {
        OutputFormat::Json => output::print_json(&children),
        OutputFormat::Text => {
            if children.is_empty() {
                println!("No children found");
                return Ok(());
            }
            println!(
                "{:<36} {:<24} {:>10} {:>10} {:>6}",
                "ID", "Name", "Allowance", "Balance", "Points"
            );
            output::print_divider();
            for child in &children {
                println!(
                    "{:<36} {:<24} {:>10} {:>10} {:>6}",
                    child.id,
                    child.full_name,
                    output::money(child.monthly_allowance),
                    output::money(child.current_balance),
                    child.points
                );
            }
        }
    }
    Ok(())
}

pub async fn children_show(client: &AllowanceClient, id: &str, format: &OutputFormat) -> Result<()> {
    let child = client.get_child(id).await?;
    print_child(&child, format);
    Ok(())
}

/// Create a child account, prompting for its password.
pub async fn children_create(
    client: &AllowanceClient,
    email: String,
    first_name: String,
    last_name: String,
    allowance: f64,
    format: &OutputFormat,
) -> Result<()> {
    let password = prompt_password("Child's password: ")?;
    let mut request = CreateChildRequest::new(email, password, first_name, last_name);
    request.monthly_allowance = allowance;

    let child = client.create_child(request).await?;
    print_child(&child, format);
    Ok(())
}

pub async fn children_allowance(
    client: &AllowanceClient,
    id: &str,
    amount: f64,
    format: &OutputFormat,
) -> Result<()> {
    let child = client.update_child_allowance(id, amount).await?;
    print_child(&child, format);
    Ok(())
}

pub async fn children_deduct_balance(
    client: &AllowanceClient,
    id: &str,
    amount: f64,
    format: &OutputFormat,
) -> Result<()> {
    let child = client.deduct_child_balance(id, amount).await?;
    print_child(&child, format);
    Ok(())
}

pub async fn children_deduct_points(
    client: &AllowanceClient,
    id: &str,
    points: i32,
    format: &OutputFormat,
) -> Result<()> {
    let child = client.deduct_child_points(id, points).await?;
    print_child(&child, format);
    Ok(())
}

fn print_child(child: &Child, format: &OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(child),
        OutputFormat::Text => {
            output::print_heading(&child.full_name);
            output::print_row("ID", &child.id);
            output::print_row("Email", &child.email);
            output::print_row("Allowance", &output::money(child.monthly_allowance));
            output::print_row("Balance", &output::money(child.current_balance));
            output::print_row("Points", &child.points.to_string());
        }
    }
}
