use clap::error::ErrorKind;
use faucet_agent::app::{Config, ConfigError, LogFormat, LogLevel};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const ENV_VARS: &[&str] = &[
    "FAUCET_AGENT_EVENT_SOCKET",
    "FAUCET_AGENT_PROMETHEUS_REMOTE_WRITE_URI",
    "FAUCET_AGENT_LOG_LEVEL",
    "FAUCET_AGENT_LOG_FORMAT",
    "FAUCET_AGENT_INITIAL_BACKOFF_SECS",
    "FAUCET_AGENT_MAX_BACKOFF_SECS",
    "FAUCET_AGENT_REMOTE_WRITE_TIMEOUT_SECS",
    "FAUCET_AGENT_MAX_RECORD_BYTES",
];

fn clean_env() {
    unsafe {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_defaults() {
    clean_env();
    let config = assert_ok!(Config::from_args(["faucet_agent"]));

    assert_eq!(config.event_socket, PathBuf::from("/run/faucet/event.sock"));
    assert_eq!(
        config.prometheus_remote_write_uri,
        "http://localhost:9090/api/v1/write"
    );
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.log_format, LogFormat::Text);
    assert_eq!(config.initial_backoff, Duration::from_secs(5));
    assert_eq!(config.max_backoff, Duration::from_secs(300));
    assert_eq!(config.remote_write_timeout, Duration::from_secs(15));
    assert_eq!(config.max_record_bytes, 65536);
}

#[test]
#[serial]
fn test_flags() {
    clean_env();
    let config = Config::from_args([
        "faucet_agent",
        "--event-socket",
        "/tmp/faucet.sock",
        "--prometheus-remote-write-uri",
        "https://prom.example.com/api/v1/write",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--initial-backoff-secs",
        "1",
        "--max-backoff-secs",
        "60",
    ])
    .unwrap();

    assert_eq!(config.event_socket, PathBuf::from("/tmp/faucet.sock"));
    assert_eq!(
        config.prometheus_remote_write_uri,
        "https://prom.example.com/api/v1/write"
    );
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.backoff().initial, Duration::from_secs(1));
    assert_eq!(config.backoff().max, Duration::from_secs(60));
}

#[test]
#[serial]
fn test_environment_variables() {
    clean_env();
    unsafe {
        env::set_var("FAUCET_AGENT_EVENT_SOCKET", "/var/run/faucet.sock");
        env::set_var("FAUCET_AGENT_LOG_LEVEL", "warn");
        env::set_var("FAUCET_AGENT_REMOTE_WRITE_TIMEOUT_SECS", "3");
    }

    let config = Config::from_args(["faucet_agent"]).unwrap();
    assert_eq!(config.event_socket, PathBuf::from("/var/run/faucet.sock"));
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.remote_write_timeout, Duration::from_secs(3));

    // Flags win over the environment.
    let config = Config::from_args(["faucet_agent", "--log-level", "trace"]).unwrap();
    assert_eq!(config.log_level, LogLevel::Trace);

    clean_env();
}

#[test]
#[serial]
fn test_invalid_uri_rejected() {
    clean_env();
    let err = assert_err!(Config::from_args([
        "faucet_agent",
        "--prometheus-remote-write-uri",
        "not a uri",
    ]));
    assert!(matches!(err, ConfigError::InvalidUrl(_)));
}

#[test]
#[serial]
fn test_invalid_backoff_rejected() {
    clean_env();
    let result = Config::from_args([
        "faucet_agent",
        "--initial-backoff-secs",
        "10",
        "--max-backoff-secs",
        "5",
    ]);
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
#[serial]
fn test_help_and_version_are_cli_errors() {
    clean_env();
    for (flag, kind) in [
        ("--help", ErrorKind::DisplayHelp),
        ("--version", ErrorKind::DisplayVersion),
        ("-V", ErrorKind::DisplayVersion),
    ] {
        match Config::from_args(["faucet_agent", flag]) {
            Err(ConfigError::Cli(e)) => assert_eq!(e.kind(), kind),
            other => panic!("Expected clap error for {flag}, got {other:?}"),
        }
    }
}

#[test]
#[serial]
fn test_version_output_has_v_prefix() {
    clean_env();
    match Config::from_args(["faucet_agent", "--version"]) {
        Err(ConfigError::Cli(e)) => assert_eq!(
            e.to_string().trim_end(),
            format!("faucet_agent v{}", faucet_agent::VERSION)
        ),
        other => panic!("Expected version output, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_unknown_flag_and_bad_value() {
    clean_env();
    assert!(matches!(
        Config::from_args(["faucet_agent", "--no-such-flag"]),
        Err(ConfigError::Cli(e)) if e.kind() == ErrorKind::UnknownArgument
    ));
    assert!(matches!(
        Config::from_args(["faucet_agent", "--log-level", "verbose"]),
        Err(ConfigError::Cli(e)) if e.kind() == ErrorKind::InvalidValue
    ));
    assert!(matches!(
        Config::from_args(["faucet_agent", "--max-record-bytes", "lots"]),
        Err(ConfigError::Cli(e)) if e.kind() == ErrorKind::ValueValidation
    ));
}
