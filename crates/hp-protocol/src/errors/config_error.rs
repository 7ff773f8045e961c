use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Could not read config file {path}")]
    #[diagnostic(code(hp::config::read))]
    Read {
        path: String,
        #[help]
        msg: String,
    },

    #[error("Invalid config file")]
    #[diagnostic(code(hp::config::parse))]
    Parse {
        #[help]
        msg: String,
    },

    #[error("Invalid value for `{key}`: {msg}")]
    #[diagnostic(code(hp::config::invalid_value))]
    InvalidValue { key: String, msg: String },
}
