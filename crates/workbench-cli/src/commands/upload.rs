use crate::commands::{interaction_line, print_json, Context};
use anyhow::{Context as _, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use workbench_client::CsvUpload;
use workbench_core::decode_interactions;
use workbench_core::time::now_utc;

#[derive(Debug, Args)]
pub struct UploadCsvArgs {
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportJsonArgs {
    pub path: PathBuf,
}

pub fn upload_csv(ctx: &Context<'_>, args: UploadCsvArgs) -> Result<()> {
    let upload = CsvUpload::from_path(&args.path)
        .with_context(|| format!("read {}", args.path.display()))?;
    let receipt = ctx.client.upload_csv(upload)?;

    if ctx.json {
        print_json(&receipt)?;
    } else {
        println!("ingested {} interactions", receipt.ingested);
    }
    Ok(())
}

/// Records are created one by one; the first failure stops the import.
pub fn import_json(ctx: &Context<'_>, args: ImportJsonArgs) -> Result<()> {
    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("read {}", args.path.display()))?;
    let records = decode_interactions(&text, now_utc())?;
    debug!(count = records.len(), "decoded interactions");

    let mut created = Vec::with_capacity(records.len());
    for record in &records {
        created.push(ctx.client.create_interaction(record)?);
    }

    if ctx.json {
        print_json(&created)?;
        return Ok(());
    }
    for interaction in &created {
        println!("{}", interaction_line(interaction));
    }
    println!("imported {} interactions", created.len());
    Ok(())
}
