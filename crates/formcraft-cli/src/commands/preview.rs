use super::Context;
use anyhow::{bail, Result};
use colored::Colorize;
use formcraft::{PreviewSession, PreviewStatus, SubmitOutcome};

pub fn execute(ctx: &Context, id: &str, set: &[(String, String)], submit: bool, json: bool) -> Result<()> {
    let mut session = PreviewSession::new(id).with_max_passes(ctx.config.preview.max_passes());
    session.load(&ctx.repo);

    if session.status() == PreviewStatus::NotFound {
        println!("{}", "Form not found".yellow().bold());
        return Ok(());
    }

    for (field_id, raw) in set {
        session.set_input(field_id, raw)?;
    }

    let outcome = if submit { Some(session.submit()?) } else { None };

    if json {
        let body = match &outcome {
            Some(SubmitOutcome::Accepted(values)) => serde_json::json!({ "accepted": true, "values": values }),
            Some(SubmitOutcome::Rejected(errors)) => serde_json::json!({ "accepted": false, "errors": errors }),
            None => serde_json::json!({ "fields": session.widgets() }),
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        if let Some(form) = session.form() {
            println!("{}", form.name.green().bold());
            println!();
        }
        for widget in session.widgets() {
            println!("  {}", widget);
        }
    }

    match outcome {
        Some(SubmitOutcome::Accepted(values)) => {
            if !json {
                println!();
                println!("{}", "Form submitted successfully!".green().bold());
                println!("{}", serde_json::to_string_pretty(&values)?);
            }
        }
        Some(SubmitOutcome::Rejected(errors)) => {
            let fields: Vec<&str> = errors.iter().map(|(field_id, _)| field_id).collect();
            let plural = if fields.len() == 1 { "" } else { "s" };
            bail!("{} field{} failed validation: {}", fields.len(), plural, fields.join(", "));
        }
        None => {}
    }

    Ok(())
}
