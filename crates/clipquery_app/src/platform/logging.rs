use std::path::PathBuf;

use clipquery_logging::{LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;

use super::cli::{GlobalArgs, LogTarget};

/// Installs the global logger selected on the command line.
///
/// The terminal shares the screen with panel output, so it only gets
/// warnings unless `--debug` is given. The log file gets everything from
/// info up.
pub fn initialize(args: &GlobalArgs) {
    let level = match (args.debug, args.log) {
        (true, _) => LevelFilter::Debug,
        (false, LogTarget::Terminal) => LevelFilter::Warn,
        (false, _) => LevelFilter::Info,
    };
    let _ = clipquery_logging::initialize(destination(args.log), level);
}

fn destination(target: LogTarget) -> LogDestination {
    let file = PathBuf::from(DEFAULT_LOG_FILE);
    match target {
        LogTarget::Off => LogDestination::Off,
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::File => LogDestination::File(file),
        LogTarget::Both => LogDestination::Both(file),
    }
}
