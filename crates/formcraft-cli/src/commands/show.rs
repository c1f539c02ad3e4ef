use super::Context;
use anyhow::{Context as _, Result};
use formcraft::FormRepository;

pub fn execute(ctx: &Context, id: &str) -> Result<()> {
    let form = ctx
        .repo
        .find(id)
        .with_context(|| format!("No saved form with id {}", id))?;

    println!("{}", serde_json::to_string_pretty(&form)?);
    Ok(())
}
