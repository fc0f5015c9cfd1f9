use anyhow::Error;
use std::process::ExitCode;
use thiserror::Error as ThisError;
use workbench_client::{error_message, ApiError};
use workbench_config::ConfigError;
use workbench_core::time::TimeParseError;
use workbench_core::{CoreError, FormError, UploadDecodeError};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

/// Verbose output shows the whole context chain; otherwise the server's
/// own message wins when it sent one.
pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", error_message(&**err));
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if cause.downcast_ref::<CliError>().is_some() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(api_err) = cause.downcast_ref::<ApiError>() {
            return ExitCode::from(api_exit_code(api_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if cause.downcast_ref::<FormError>().is_some()
            || cause.downcast_ref::<UploadDecodeError>().is_some()
            || cause.downcast_ref::<CoreError>().is_some()
            || cause.downcast_ref::<TimeParseError>().is_some()
        {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn api_exit_code(err: &ApiError) -> u8 {
    match err {
        ApiError::Status { status: 404, .. } => EXIT_NOT_FOUND,
        ApiError::Status {
            status: 400 | 422, ..
        } => EXIT_INVALID_INPUT,
        ApiError::Url(_) => EXIT_INVALID_INPUT,
        ApiError::Status { .. }
        | ApiError::Transport(_)
        | ApiError::Decode(_)
        | ApiError::Encode(_) => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InvalidPageSize(_)
        | ConfigError::InvalidBaseUrl(_)
        | ConfigError::InvalidFilter(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::{api_exit_code, EXIT_FAILURE, EXIT_INVALID_INPUT, EXIT_NOT_FOUND};
    use workbench_client::ApiError;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            payload: None,
        }
    }

    #[test]
    fn http_statuses_map_to_exit_codes() {
        assert_eq!(api_exit_code(&status(404)), EXIT_NOT_FOUND);
        assert_eq!(api_exit_code(&status(400)), EXIT_INVALID_INPUT);
        assert_eq!(api_exit_code(&status(422)), EXIT_INVALID_INPUT);
        assert_eq!(api_exit_code(&status(500)), EXIT_FAILURE);
        assert_eq!(
            api_exit_code(&ApiError::Transport("refused".to_string())),
            EXIT_FAILURE
        );
    }
}
