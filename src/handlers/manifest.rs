//! Manifest and rule handlers

use anyhow::{Context, Result};
use colored::Colorize;

use super::{audit, ensure_fetched};
use crate::report;
use crate::rules::Rule;
use crate::session::{ActionOutcome, SyncSession};
use crate::transport::Transport;

/// Handle manifest show command
pub fn handle_manifest_show<T: Transport>(session: &SyncSession<T>) -> Result<()> {
    println!(
        "{} {}",
        "Manifest:".bold(),
        session.manifest_path().display()
    );
    println!();
    report::print_manifest(session.manifest());
    Ok(())
}

/// Handle manifest save command
pub fn handle_manifest_save<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    ensure_fetched(session)?;
    session.save_manifest().context("Failed to save manifest")?;
    println!(
        "{} {}",
        "Manifest saved to".green(),
        session.manifest_path().display()
    );
    Ok(())
}

/// Handle manifest upload command
pub fn handle_manifest_upload<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    ensure_fetched(session)?;
    match session
        .upload_manifest()
        .context("Failed to upload manifest")?
    {
        ActionOutcome::Completed => {
            audit(&format!("Uploaded manifest {}", session.manifest_path().display()));
            println!("{}", "Manifest uploaded.".green());
        }
        ActionOutcome::Cancelled => println!("{}", "Manifest upload skipped.".yellow()),
    }
    Ok(())
}

/// Handle rules list command
pub fn handle_rules_list<T: Transport>(session: &SyncSession<T>) -> Result<()> {
    let rules = &session.manifest().rules;
    if rules.is_empty() {
        println!("{}", "No rules defined.".yellow());
        return Ok(());
    }

    println!("{}", "Directory Rules".cyan().bold());
    for (idx, rule) in rules.iter().enumerate() {
        println!("  {}. {}", idx, rule);
    }
    Ok(())
}

/// Handle rules add command
pub fn handle_rules_add<T: Transport>(
    session: &mut SyncSession<T>,
    source: &str,
    target: &str,
) -> Result<()> {
    let source = source.trim().trim_end_matches('/');
    if source.is_empty() {
        anyhow::bail!("Rule source directory cannot be empty");
    }

    let rule = Rule::directory_match(source, target.trim().trim_end_matches('/'));
    session.manifest_mut().add_rule(rule.clone());
    session.save_rules().context("Failed to save manifest")?;

    println!("{} {}", "Added rule".green(), rule);
    println!("{}", "Fetch again to apply it.".dimmed());
    Ok(())
}

/// Handle rules remove command
pub fn handle_rules_remove<T: Transport>(session: &mut SyncSession<T>, index: usize) -> Result<()> {
    let rule = session.manifest_mut().remove_rule(index).ok_or_else(|| {
        anyhow::anyhow!(
            "No rule at index {index} ({} rules defined)",
            session.manifest().rules.len()
        )
    })?;
    session.save_rules().context("Failed to save manifest")?;

    println!("{} {}", "Removed rule".green(), rule);
    Ok(())
}
