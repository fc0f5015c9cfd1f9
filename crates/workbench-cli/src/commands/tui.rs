use anyhow::{anyhow, Result};
use clap::Args;
use std::env;
use std::path::PathBuf;
use std::process::Command;
use workbench_config::parse_base_url;
use workbench_core::query::validate_page_size;

const TUI_BINARY: &str = "workbench-tui";

#[derive(Debug, Args)]
pub struct TuiArgs {
    /// Rows per page; overrides the configured page size
    #[arg(long)]
    pub page_size: Option<u32>,
}

pub fn launch(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    args: TuiArgs,
    verbose: bool,
) -> Result<()> {
    let mut command = build_command(config_path, base_url, args.page_size)?;
    if verbose {
        eprintln!("launching {:?}", command.get_program());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = command.exec();
        Err(exec_error(err))
    }

    #[cfg(not(unix))]
    {
        use anyhow::Context as _;
        let status = command
            .status()
            .with_context(|| format!("launch {}", TUI_BINARY))?;
        std::process::exit(status.code().unwrap_or(1));
    }
}

fn build_command(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    page_size: Option<u32>,
) -> Result<Command> {
    let mut command = Command::new(find_tui_binary());
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    if let Some(raw) = base_url {
        let url = parse_base_url(&raw)?;
        command.arg("--base-url").arg(url.as_str());
    }
    if let Some(size) = page_size {
        let size = validate_page_size(size)?;
        command.arg("--page-size").arg(size.to_string());
    }
    Ok(command)
}

fn find_tui_binary() -> PathBuf {
    let name = format!("{}{}", TUI_BINARY, env::consts::EXE_SUFFIX);
    env::current_exe()
        .ok()
        .and_then(|current| current.parent().map(|dir| dir.join(&name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}

fn exec_error(err: std::io::Error) -> anyhow::Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        return anyhow!(
            "{} binary not found; build it with `cargo build -p workbench-tui` or install the package",
            TUI_BINARY
        );
    }
    anyhow!("launch {} failed: {}", TUI_BINARY, err)
}
