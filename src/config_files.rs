use hp_protocol::{Config, ConfigError};
use std::path::Path;

/// Reads the config file, or returns the defaults if none was given.
pub(crate) fn read_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    log::debug!("reading config from {}", path.display());
    let source = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.display().to_string(),
        msg: err.to_string(),
    })?;
    Config::from_toml(&source)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(read_config(None), Ok(Config::default()));
    }

    #[test]
    fn reads_limits_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[limits]\nsteps = 42").expect("write config");

        let config = read_config(Some(file.path())).expect("valid config");
        assert_eq!(config.limits.steps, Some(42));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            read_config(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
    }
}
