use super::Context;
use anyhow::Result;
use colored::Colorize;
use formcraft::FormsList;

pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let list = FormsList::load(&ctx.repo);

    if json {
        println!("{}", serde_json::to_string_pretty(&list.entries())?);
        return Ok(());
    }

    println!("{}", "My Forms".green().bold());
    println!();

    if list.is_empty() {
        println!("No saved forms yet. Create one with `formcraft new`.");
        return Ok(());
    }

    for entry in list.entries() {
        println!("  {}", entry);
    }

    Ok(())
}
