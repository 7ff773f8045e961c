use clap::ValueEnum;
use log::{Level, LevelFilter, SetLoggerError};
use simplelog::{
    format_description, Color, ColorChoice, Config, ConfigBuilder, LevelPadding, TermLogger,
    TerminalMode, WriteLogger,
};
use std::{fs::File, path::Path, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File,
}

/// Installs the global logger. `log_file` is only used with [`LogTarget::File`]; without it the
/// log goes to `haltpoint-<pid>.log` in the temp directory.
pub fn logger(
    f: impl FnOnce(&mut ConfigBuilder) -> (LevelFilter, LogTarget),
    log_file: Option<&Path>,
) -> Result<(), SetLoggerError> {
    let mut builder = ConfigBuilder::new();
    let (level, target) = f(&mut builder);
    let config = builder.build();

    match target {
        LogTarget::Stdout => TermLogger::init(level, config, TerminalMode::Stdout, ColorChoice::Auto),
        LogTarget::Stderr => TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto),
        LogTarget::File => {
            let path = match log_file {
                Some(path) => path.to_path_buf(),
                None => std::env::temp_dir().join(format!("haltpoint-{}.log", std::process::id())),
            };
            set_write_logger(level, config, &path)
        }
    }
}

fn set_write_logger(level: LevelFilter, config: Config, path: &Path) -> Result<(), SetLoggerError> {
    // Fall back to stderr if the log file can't be created.
    match File::create(path) {
        Ok(file) => WriteLogger::init(level, config, file),
        Err(_) => TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto),
    }
}

pub fn configure(level: &str, target: LogTarget, builder: &mut ConfigBuilder) -> (LevelFilter, LogTarget) {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Warn);

    // Only our own crates
    builder.add_filter_allow_str("haltpoint");
    builder.add_filter_allow_str("hp_engine");
    builder.add_filter_allow_str("hp_system");

    builder.set_level_padding(LevelPadding::Right);
    builder.set_time_format_custom(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));
    // Show module path
    builder.set_target_level(LevelFilter::Error);
    // The watchdog logs from its own thread
    builder.set_thread_level(LevelFilter::Trace);

    // Only TermLogger supports color output
    if let LogTarget::Stdout | LogTarget::Stderr = target {
        Level::iter().for_each(|level| set_colored_level(builder, level));
    }

    (level, target)
}

fn set_colored_level(builder: &mut ConfigBuilder, level: Level) {
    let color = match level {
        Level::Trace => Color::Magenta,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
    };
    builder.set_level_color(level, Some(color));
}
