use std::path::Path;

use flexi_logger::{
    opt_format, Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming,
};

/// Starts a logger writing to stderr.
///
/// The level comes from `RUST_LOG` when set, otherwise from `default_spec`
/// (e.g. `"info"` or `"mc_search=debug"`).
pub fn setup_logging(default_spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .log_to_stderr()
        .format(opt_format)
        .start()
}

/// Starts a logger writing rotated files into `directory`.
pub fn setup_file_logging(
    default_spec: &str,
    directory: &Path,
) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .log_to_file(FileSpec::default().directory(directory))
        .format(opt_format)
        .rotate(
            Criterion::Size(10 * 1024 * 1024), // Rotate logs after they reach 10 MB
            Naming::Numbers,
            Cleanup::KeepLogFiles(3),
        )
        .start()
}
