//! Example service built on the self-service SDK.
//!
//! Reads one JSON request from stdin and writes the JSON response to stdout.
//! Configuration comes from the environment, or from the file passed with
//! `--config`.

use log::{debug, info};
use self_service_sdk::configutil::{
    new_config_from_env, new_config_from_file, ConfigFile, DefaultValue, EnvVariable,
};
use self_service_sdk::logutil::{init_logger, LogLevel, LogOutput, TimeFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::{self, Read, Write};
use std::path::Path;

/// Incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Request {
    #[serde(rename = "RequestID")]
    request_id: String,
    #[serde(rename = "Payload")]
    payload: String,
}

/// Outgoing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Response {
    #[serde(rename = "Payload")]
    payload: String,
}

/// Settings the service reads from its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    env: String,
    log_level: LogLevel,
    time_format: TimeFormat,
    somekey: String,
}

fn defaults() -> Vec<DefaultValue> {
    vec![
        DefaultValue::new("env", "dev"),
        DefaultValue::new("log.level", "INFO"),
        DefaultValue::new("log.time_format", "UNIX"),
        DefaultValue::new("somekey", ""),
    ]
}

fn env_variables() -> Vec<EnvVariable> {
    vec![
        EnvVariable::new("Environment", "env"),
        EnvVariable::new("LogLevel", "log.level"),
        EnvVariable::new("Something", "somekey"),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = init(env::args());

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let request: Request = serde_json::from_str(&input)?;

    let response = handler(&settings, request);
    serde_json::to_writer(io::stdout().lock(), &response)?;
    io::stdout().flush()?;

    Ok(())
}

/// Parses the command line, loads the configuration and starts logging.
#[doc(hidden)]
fn init(args: impl IntoIterator<Item = String>) -> Settings {
    let mut args = args.into_iter();
    let usage = format!(
        "Usage: {} [--config <file>]",
        args.next().unwrap_or_default().as_str()
    );
    let usage = usage.as_str();
    let mut config_file = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                config_file = args.next().or_else(|| err_exit("Argument expected", usage))
            }
            "-h" | "--help" => err_exit("", usage),
            _ => err_exit(&format!("Unknown option {arg}"), usage),
        }
    }

    let settings = match load_settings(config_file.as_deref()) {
        Ok(settings) => settings,
        Err(msg) => err_exit(&msg.to_string(), ""),
    };

    if let Err(msg) = init_logger(settings.time_format, settings.log_level, &LogOutput::Console) {
        err_exit(&msg.to_string(), "");
    }
    info!("{} service started", settings.env);

    settings
}

/// Reads the settings from `file` when given, otherwise from the environment.
fn load_settings(file: Option<&str>) -> Result<Settings, Box<dyn std::error::Error>> {
    let config = match file {
        Some(file) => {
            let path = Path::new(file);
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let config_type = path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            new_config_from_file(&defaults(), &ConfigFile::new(name, &config_type, dir)?)?
        }
        None => new_config_from_env(&defaults(), &env_variables())?,
    };

    Ok(Settings {
        env: config.get_string("env")?,
        log_level: LogLevel::from(config.get_string("log.level")?.as_str()),
        time_format: TimeFormat::from(config.get_string("log.time_format")?.as_str()),
        somekey: config.get_string("somekey")?,
    })
}

/// Echoes the request payload back.
fn handler(settings: &Settings, request: Request) -> Response {
    debug!(
        "handling request {} in {} (somekey: {:?})",
        request.request_id, settings.env, settings.somekey
    );
    Response {
        payload: request.payload,
    }
}

/// Private helper print error messages and exit the process with an error.
#[doc(hidden)]
#[cfg(not(test))]
fn err_exit(msg: &str, usage: &str) -> ! {
    if !msg.is_empty() {
        eprintln!("{msg}");
    }
    if !usage.is_empty() {
        eprintln!("{usage}");
    }
    std::process::exit(1);
}
#[cfg(test)] // Use panic for testing
fn err_exit(msg: &str, usage: &str) -> ! {
    if !msg.is_empty() {
        panic!("{msg} !!!");
    }
    if !usage.is_empty() {
        panic!("#{usage}");
    }
    panic!("Should not get here");
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_DIR: &str = "../self_service_sdk/tests/resources/configs";

    fn args(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_request_response_json() {
        let request: Request =
            serde_json::from_str(r#"{"RequestID":"42","Payload":"hello"}"#).unwrap();
        assert_eq!(request.request_id, "42");

        let settings = load_settings(Some(&format!("{CONFIG_DIR}/service.json"))).unwrap();
        let response = handler(&settings, request);
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"Payload":"hello"}"#
        );
    }

    #[test]
    fn test_settings_from_file() {
        let settings = load_settings(Some(&format!("{CONFIG_DIR}/service.yaml"))).unwrap();
        assert_eq!(settings.env, "test");
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.time_format, TimeFormat::Unix);
        assert_eq!(settings.somekey, "");
    }

    #[test]
    fn test_settings_from_env() {
        env::set_var("Something", "fromenv");
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.somekey, "fromenv");
    }

    #[test]
    fn test_unsupported_config_file() {
        assert!(load_settings(Some("service.ini")).is_err());
        assert!(load_settings(Some(&format!("{CONFIG_DIR}/missing.toml"))).is_err());
    }

    #[test]
    fn test_init_with_config_file() {
        let settings = init(args(&[
            "self_service_example",
            "--config",
            &format!("{CONFIG_DIR}/service.toml"),
        ]));
        assert_eq!(settings.env, "test");
    }

    #[test]
    #[should_panic(expected = "#Usage: self_service_example [--config <file>]")]
    fn test_help() {
        init(args(&["self_service_example", "--help"]));
    }

    #[test]
    #[should_panic(expected = "Argument expected !!!")]
    fn test_missing_config_argument() {
        init(args(&["self_service_example", "--config"]));
    }

    #[test]
    #[should_panic(expected = "Unknown option --verbose !!!")]
    fn test_unknown_option() {
        init(args(&["self_service_example", "--verbose"]));
    }

    #[test]
    #[should_panic(expected = "!!!")]
    fn test_bad_config_file() {
        init(args(&[
            "self_service_example",
            "--config",
            &format!("{CONFIG_DIR}/invalid.json"),
        ]));
    }
}
