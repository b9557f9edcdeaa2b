//! CLI command implementations.

mod auth;
mod children;
mod items;
mod lists;

pub use auth::{login, logout, me, register, LoginAs};
pub use children::{
    children_allowance, children_create, children_deduct_balance, children_deduct_points,
    children_list, children_show,
};
pub use items::{items_add, items_complete, items_delete, items_update, items_verify};
pub use lists::{
    lists_approve, lists_child_active, lists_child_pending, lists_create, lists_delete, lists_mine,
    lists_reject, lists_rename, lists_submit,
};

use anyhow::Result;
use std::io::{self, Write};

/// Read a line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Read a password without echo.
fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(label)?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
