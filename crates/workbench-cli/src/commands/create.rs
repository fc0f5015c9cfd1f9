use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use workbench_core::time::now_utc;
use workbench_core::InteractionForm;

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub product_id: String,
    #[arg(long)]
    pub customer_id: String,
    /// CHAT, EMAIL, TICKET or FORM
    #[arg(long = "type")]
    pub interaction_type: String,
    #[arg(long)]
    pub rating: Option<String>,
    #[arg(long)]
    pub feedback: Option<String>,
    /// Support team response
    #[arg(long)]
    pub response: Option<String>,
    /// Local timestamp; defaults to now
    #[arg(long)]
    pub when: Option<String>,
}

impl From<CreateArgs> for InteractionForm {
    fn from(args: CreateArgs) -> Self {
        InteractionForm {
            product_id: args.product_id,
            customer_id: args.customer_id,
            interaction_type: args.interaction_type,
            customer_rating: args.rating.unwrap_or_default(),
            feedback: args.feedback.unwrap_or_default(),
            interaction_date: args.when.unwrap_or_default(),
            response: args.response.unwrap_or_default(),
        }
    }
}

pub fn create_interaction(ctx: &Context<'_>, args: CreateArgs) -> Result<()> {
    let record = InteractionForm::from(args).to_new_interaction(now_utc())?;
    let saved = ctx.client.create_interaction(&record)?;

    if ctx.json {
        print_json(&saved)?;
    } else {
        match saved.id {
            Some(id) => println!("created interaction {}", id),
            None => println!("created interaction"),
        }
    }
    Ok(())
}
