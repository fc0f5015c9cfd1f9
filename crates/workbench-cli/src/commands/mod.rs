use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use workbench_client::{HttpTransport, InteractionsClient};
use workbench_config::AppConfig;
use workbench_core::format::{format_date_time, interaction_message, truncate};
use workbench_core::Interaction;

pub mod completions;
pub mod create;
pub mod list;
pub mod show;
pub mod tui;
pub mod upload;

pub const MESSAGE_WIDTH: usize = 60;

pub struct Context<'a> {
    pub client: &'a InteractionsClient<HttpTransport>,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// One-line summary used by list and import output.
pub fn interaction_line(interaction: &Interaction) -> String {
    let id = interaction
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let message = interaction_message(interaction);
    format!(
        "{}  {}  customer {}  product {}  [{}]  {}",
        id,
        format_date_time(Some(&interaction.interaction_date)),
        interaction.customer_id,
        interaction.product_id,
        interaction.interaction_type,
        truncate(Some(message), MESSAGE_WIDTH)
    )
}
