use super::Context;
use anyhow::{Context as _, Result};
use colored::Colorize;
use formcraft::{BuilderState, FieldDraft};

pub fn execute(ctx: &Context, name: &str, fields: Vec<FieldDraft>) -> Result<()> {
    println!("{}", "Creating form...".green().bold());
    println!();

    let mut builder = BuilderState::new();
    for draft in fields {
        let label = draft.label.clone();
        let field = draft
            .build()
            .with_context(|| format!("Invalid field '{}'", label))?;
        builder.add_field(field)?;
    }

    let form = builder.save(name, &ctx.repo)?;

    for field in &form.fields {
        let required = if field.required { " - Required" } else { "" };
        println!("  {} ({}){}  [{}]", field.label, field.field_type, required, field.id.dimmed());
    }

    println!();
    println!("{}", "Form saved successfully!".green().bold());
    println!("ID: {}", form.id.cyan());

    Ok(())
}
