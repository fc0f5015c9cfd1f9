use crate::commands::{interaction_line, print_json, Context};
use anyhow::Result;
use clap::Args;
use workbench_core::form::{parse_date, parse_interaction_type, parse_numeric};
use workbench_core::query::validate_page_size;
use workbench_core::{CustomerId, InteractionQuery, ProductId, QueryPatch};

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub customer_id: Option<String>,
    #[arg(long)]
    pub product_id: Option<String>,
    /// CHAT, EMAIL, TICKET or FORM
    #[arg(long = "type")]
    pub interaction_type: Option<String>,
    /// Local date or date-time, e.g. 2025-01-31 or 2025-01-31T09:00
    #[arg(long)]
    pub from: Option<String>,
    #[arg(long)]
    pub to: Option<String>,
    /// Zero-based page number
    #[arg(long, default_value_t = 0)]
    pub page: u32,
    #[arg(long)]
    pub size: Option<u32>,
}

impl ListArgs {
    /// Flags given on the command line override the configured filters.
    fn to_patch(&self) -> Result<QueryPatch> {
        let overrides = InteractionQuery {
            customer_id: optional(&self.customer_id, |raw| {
                parse_numeric::<CustomerId>("customer id", raw)
            })?,
            product_id: optional(&self.product_id, |raw| {
                parse_numeric::<ProductId>("product id", raw)
            })?,
            interaction_type: optional(&self.interaction_type, parse_interaction_type)?,
            start_date: optional(&self.from, |raw| parse_date("from", raw))?,
            end_date: optional(&self.to, |raw| parse_date("to", raw))?,
            page: Some(self.page),
            size: self.size.map(validate_page_size).transpose()?,
        };
        Ok(QueryPatch::from(overrides))
    }
}

fn optional<T, E>(
    raw: &Option<String>,
    parse: impl Fn(&str) -> std::result::Result<Option<T>, E>,
) -> std::result::Result<Option<T>, E> {
    match raw {
        Some(raw) => parse(raw),
        None => Ok(None),
    }
}

pub fn list_interactions(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let page_size = ctx.config.list.page_size;
    let base = InteractionQuery::first_page(page_size).overlay(&ctx.config.list.filters);
    let query = base.apply(&args.to_patch()?, page_size);

    let page = ctx.client.fetch_interactions(&query)?;

    if ctx.json {
        print_json(&page)?;
        return Ok(());
    }

    if page.content.is_empty() {
        println!("no interactions");
    }
    for interaction in &page.content {
        println!("{}", interaction_line(interaction));
    }
    println!(
        "page {} of {} ({} total)",
        page.display_number(),
        page.total_pages,
        page.total_elements
    );
    Ok(())
}
