use super::{apply_config, load_config_file, types::DurationValue};
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{HttpMethod, LatencyArgs};
use crate::error::{AppError, ConfigError};

fn args_from(argv: &[&str]) -> Result<(LatencyArgs, clap::ArgMatches), String> {
    let matches = LatencyArgs::command()
        .try_get_matches_from(argv)
        .map_err(|err| format!("parse args failed: {}", err))?;
    let args = LatencyArgs::from_arg_matches(&matches)
        .map_err(|err| format!("parse args failed: {}", err))?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config_with_trigger_table() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("deploylat.toml");
    let content = r#"
work_items = "work.txt"
streams = "topics.txt"
concurrency = 12
min_delay = "0ms"
max_delay = 2
threshold = "90s"
store_ttl = "15m"

[trigger]
method = "put"
url = "https://control.example.com/apis/{{operation}}/deploy"
headers = ["Authorization: Bearer abc", "X-Org: {{target}}"]
timeout = "10s"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.max_delay != Some(DurationValue::Seconds(2)) {
        return Err(format!("Unexpected max_delay: {:?}", config.max_delay));
    }
    let trigger = config
        .trigger
        .as_ref()
        .ok_or_else(|| "Expected trigger table".to_owned())?;
    if trigger.method != Some(HttpMethod::Put) {
        return Err("Unexpected trigger method".to_owned());
    }

    let (mut args, matches) = args_from(&["deploylat"])?;
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    let checks = [
        (args.work_items.as_deref() == Some("work.txt"), "Unexpected work_items"),
        (args.streams.as_deref() == Some("topics.txt"), "Unexpected streams"),
        (args.concurrency.get() == 12, "Unexpected concurrency"),
        (args.min_delay.is_zero(), "Expected zero min_delay"),
        (args.max_delay == Duration::from_secs(2), "Unexpected max_delay"),
        (args.threshold == Duration::from_secs(90), "Unexpected threshold"),
        (args.store_ttl == Duration::from_secs(900), "Unexpected store_ttl"),
        (args.trigger_method == HttpMethod::Put, "Unexpected trigger_method"),
        (
            args.trigger_url.as_deref()
                == Some("https://control.example.com/apis/{{operation}}/deploy"),
            "Unexpected trigger_url",
        ),
        (args.trigger_headers.len() == 2, "Unexpected trigger_headers"),
        (
            args.trigger_timeout == Duration::from_secs(10),
            "Unexpected trigger_timeout",
        ),
    ];
    for (ok, msg) in checks {
        if !ok {
            return Err(msg.to_owned());
        }
    }
    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("deploylat.json");
    let content = r#"{"streams": "topics.txt", "rate": 5, "duration": "30m", "trigger": {"url": "http://localhost/{{operation}}"}}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let (mut args, matches) = args_from(&["deploylat"])?;
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.rate.map(|rate| rate.get()) != Some(5) {
        return Err("Unexpected rate".to_owned());
    }
    if args.duration != Some(Duration::from_secs(1_800)) {
        return Err(format!("Unexpected duration: {:?}", args.duration));
    }
    if args.trigger_url.as_deref() != Some("http://localhost/{{operation}}") {
        return Err("Unexpected trigger_url".to_owned());
    }
    Ok(())
}

#[test]
fn cli_values_win_over_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("deploylat.toml");
    std::fs::write(&path, "concurrency = 12\nlate_log = \"late.txt\"\n[trigger]\nurl = \"http://config/\"\n")
        .map_err(|err| format!("write failed: {}", err))?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;

    let (mut args, matches) =
        args_from(&["deploylat", "--concurrency", "3", "--trigger-url", "http://cli/"])?;
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.concurrency.get() != 3 {
        return Err(format!("CLI concurrency lost: {}", args.concurrency.get()));
    }
    if args.trigger_url.as_deref() != Some("http://cli/") {
        return Err("CLI trigger_url lost".to_owned());
    }
    if args.late_log != "late.txt" {
        return Err("Config late_log not applied".to_owned());
    }
    Ok(())
}

#[test]
fn zero_concurrency_in_config_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("deploylat.toml");
    std::fs::write(&path, "concurrency = 0\n").map_err(|err| format!("write failed: {}", err))?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let (mut args, matches) = args_from(&["deploylat"])?;

    match apply_config(&mut args, &matches, &config) {
        Err(AppError::Config(ConfigError::FieldMustBePositive { field, .. }))
            if field == "concurrency" =>
        {
            Ok(())
        }
        other => Err(format!("Expected positive-field error, got {:?}", other)),
    }
}

#[test]
fn invalid_duration_names_the_field() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("deploylat.toml");
    std::fs::write(&path, "threshold = \"soon\"\n")
        .map_err(|err| format!("write failed: {}", err))?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let (mut args, matches) = args_from(&["deploylat"])?;

    match apply_config(&mut args, &matches, &config) {
        Err(AppError::Config(ConfigError::InvalidDuration {
            field: "threshold",
            ..
        })) => Ok(()),
        other => Err(format!("Expected invalid duration error, got {:?}", other)),
    }
}

#[test]
fn unknown_keys_and_extensions_are_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let typo = dir.path().join("deploylat.toml");
    std::fs::write(&typo, "concurency = 4\n").map_err(|err| format!("write failed: {}", err))?;
    if !matches!(
        load_config_file(&typo),
        Err(AppError::Config(ConfigError::ParseToml { .. }))
    ) {
        return Err("Expected TOML error for unknown key".to_owned());
    }

    let yaml = dir.path().join("deploylat.yaml");
    std::fs::write(&yaml, "concurrency: 4\n").map_err(|err| format!("write failed: {}", err))?;
    if !matches!(
        load_config_file(&yaml),
        Err(AppError::Config(ConfigError::UnsupportedExtension { .. }))
    ) {
        return Err("Expected unsupported extension error".to_owned());
    }
    Ok(())
}
