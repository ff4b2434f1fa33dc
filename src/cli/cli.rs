use crate::backend::target::{MAX_REGISTER_COUNT, TargetConfig};
use std::{env, fs};
use thiserror::Error;

/// File read when no path is given
pub const DEFAULT_FILE: &str = "demos/loop_call.asm";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`{flag}` needs a value")]
    MissingValue { flag: String },

    #[error("`{value}` is not a valid value for `{flag}`")]
    InvalidValue { flag: String, value: String },

    #[error("unknown option `{0}`")]
    UnknownOption(String),
}

/// Configuration for the CLI application
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub file_path: String,
    pub target: TargetConfig,
    /// Execute the allocated program on the reference machine
    pub run: bool,
    /// Values consumed by `IN` and `READ`
    pub inputs: Vec<i64>,
    /// Print liveness and coloring tables
    pub verbose: bool,
    /// Print the control graph and interference graph in DOT
    pub dot: bool,
}

impl Config {
    /// Parse command line arguments and environment variables
    pub fn from_args() -> Result<Self, ConfigError> {
        let mut config = Self::parse(env::args().skip(1))?;
        config.verbose = env::var("VERBOSE").is_ok();
        config.dot = env::var("DOT").is_ok();
        Ok(config)
    }

    /// Parse an argument list, program name excluded
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        let mut file_path = None;
        let mut target = TargetConfig::default();
        let mut run = false;
        let mut inputs = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--registers" => {
                    let value = value_of(&arg, args.next())?;
                    let count = value
                        .parse::<usize>()
                        .ok()
                        .filter(|&n| n <= MAX_REGISTER_COUNT)
                        .ok_or_else(|| invalid(&arg, &value))?;
                    target = target.with_register_count(count);
                }
                "--run" => run = true,
                "--input" => {
                    let value = value_of(&arg, args.next())?;
                    inputs = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| s.parse::<i64>().map_err(|_| invalid(&arg, &value)))
                        .collect::<Result<_, _>>()?;
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownOption(flag.to_string()));
                }
                _ => file_path = Some(arg),
            }
        }

        Ok(Config {
            file_path: file_path.unwrap_or_else(|| DEFAULT_FILE.to_string()),
            target,
            run,
            inputs,
            verbose: false,
            dot: false,
        })
    }
}

fn value_of(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue {
        flag: flag.to_string(),
    })
}

fn invalid(flag: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

/// Read the source file from the given path
pub fn read_source_file(file_path: &str) -> Result<String, String> {
    fs::read_to_string(file_path).map_err(|e| {
        format!(
            "Error reading file '{}': {}\n\n\
            Usage: tcl-regalloc [file.asm] [--registers N] [--run] [--input a,b,c]\n\n\
            Available demos:\n\
            \x20 - demos/loop_call.asm\n\
            \x20 - demos/countdown.asm\n\
            \x20 - demos/pressure.asm",
            file_path, e
        )
    })
}
