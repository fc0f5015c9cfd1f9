use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::Result;
use clap::Args;
use workbench_core::format::{format_date_time, PLACEHOLDER};
use workbench_core::InteractionId;

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

pub fn show_interaction(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id: InteractionId = args
        .id
        .parse()
        .map_err(|_| invalid_input(format!("invalid interaction id: {}", args.id.trim())))?;
    let interaction = ctx.client.fetch_interaction(id)?;

    if ctx.json {
        return print_json(&interaction);
    }

    let or_placeholder = |value: Option<&str>| value.unwrap_or(PLACEHOLDER).to_string();
    println!("id: {}", id);
    println!("when: {}", format_date_time(Some(&interaction.interaction_date)));
    println!("customer: {}", interaction.customer_id);
    println!("product: {}", interaction.product_id);
    println!("type: {}", interaction.interaction_type.label());
    println!(
        "rating: {}",
        interaction
            .customer_rating
            .map(|rating| rating.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    );
    println!("feedback: {}", or_placeholder(interaction.feedback.as_deref()));
    println!(
        "response: {}",
        or_placeholder(interaction.responses_from_customer_support.as_deref())
    );
    Ok(())
}
