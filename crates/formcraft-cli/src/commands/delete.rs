use super::Context;
use anyhow::{bail, Result};
use colored::Colorize;
use formcraft::FormsList;

pub fn execute(ctx: &Context, id: &str) -> Result<()> {
    let mut list = FormsList::load(&ctx.repo);
    let name = match list.open(id) {
        Some(form) => form.name.clone(),
        None => bail!("No saved form with id {}", id),
    };

    list.delete(&ctx.repo, id)?;

    println!("{} {}", "Deleted".green().bold(), name.cyan());
    Ok(())
}
