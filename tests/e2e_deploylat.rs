mod support_broker;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use deploylat::args::HttpMethod;
use deploylat::domain::{StreamDescriptor, WorkItem};
use deploylat::dispatch::Trigger;
use deploylat::http::{HttpTrigger, TriggerSpec};
use deploylat::servicebus::{ServiceBusConfig, ServiceBusSource};
use deploylat::streams::StreamSource;
use tempfile::tempdir;

use support_broker::{CONFIRMATION_KIND, confirmation_payload, run_deploylat, spawn_broker};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn write_file(path: &Path, content: &str) -> Result<(), String> {
    fs::write(path, content).map_err(|err| format!("write {} failed: {}", path.display(), err))
}

fn logged_keys(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|err| format!("read {} failed: {}", path.display(), err))?;
    Ok(content
        .lines()
        .filter_map(|line| line.split_once(" diff:").map(|(key, _)| key.to_owned()))
        .collect())
}

#[test]
fn e2e_cli_classifies_confirmed_dispatches() -> Result<(), String> {
    let broker = spawn_broker()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let work_items = dir.path().join("work.txt");
    let streams = dir.path().join("streams.txt");
    let on_time_log = dir.path().join("on_time.log");
    let late_log = dir.path().join("late.log");

    write_file(
        &work_items,
        "gw-1,team-a,op-1,v1\ngw-1,team-a,op-2,v1\ngw-2,team-b,op-3,v2\n",
    )?;
    let connection = broker.connection_string();
    write_file(
        &streams,
        &format!("deployments-a\n{}\ndeployments-b\n{}\n", connection, connection),
    )?;

    let trigger_url = format!("{}/deploy/{{{{operation}}}}", broker.base_url());
    let args = vec![
        "-w".to_owned(),
        work_items.to_string_lossy().into_owned(),
        "-s".to_owned(),
        streams.to_string_lossy().into_owned(),
        "-u".to_owned(),
        trigger_url,
        "--min-delay".to_owned(),
        "10ms".to_owned(),
        "--max-delay".to_owned(),
        "20ms".to_owned(),
        "--max-dispatches".to_owned(),
        "3".to_owned(),
        "--receive-timeout".to_owned(),
        "1s".to_owned(),
        "-d".to_owned(),
        "3s".to_owned(),
        "--on-time-log".to_owned(),
        on_time_log.to_string_lossy().into_owned(),
        "--late-log".to_owned(),
        late_log.to_string_lossy().into_owned(),
    ];

    let output = run_deploylat(args)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let on_time: BTreeSet<String> = logged_keys(&on_time_log)?.into_iter().collect();
    let expected: BTreeSet<String> = ["op-1", "op-2", "op-3"]
        .into_iter()
        .map(str::to_owned)
        .collect();
    if on_time != expected {
        return Err(format!("Unexpected on-time keys: {:?}", on_time));
    }
    let late = logged_keys(&late_log)?;
    if !late.is_empty() {
        return Err(format!("Expected empty late log, got {:?}", late));
    }
    for line in ["dispatched: 3", "on_time: 3", "late: 0"] {
        if !stdout.lines().any(|candidate| candidate == line) {
            return Err(format!("Missing '{}' in summary:\n{}", line, stdout));
        }
    }

    let triggers = broker.requests_matching("POST", "/deploy/");
    if triggers.len() != 3 {
        return Err(format!("Expected 3 trigger calls, got {}", triggers.len()));
    }
    let created = broker.requests_matching("PUT", "/subscriptions/sub-");
    if created.len() != 2 {
        return Err(format!("Expected 2 subscriptions, got {}", created.len()));
    }
    let signed = created.iter().all(|request| {
        request
            .header("authorization")
            .is_some_and(|value| value.starts_with("SharedAccessSignature sr="))
    });
    if !signed {
        return Err("Subscription requests were not SAS-signed".to_owned());
    }
    let completed = broker.requests_matching("DELETE", "/messages/");
    if completed.len() != 3 {
        return Err(format!("Expected 3 completions, got {}", completed.len()));
    }
    let removed = broker.requests_matching("DELETE", "?api-version=");
    if removed.len() != 2 {
        return Err(format!("Expected 2 subscription deletions, got {}", removed.len()));
    }
    Ok(())
}

#[test]
fn e2e_cli_requires_streams_file() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let work_items = dir.path().join("work.txt");
    write_file(&work_items, "gw-1,team-a,op-1,v1\n")?;
    let work_items_arg = work_items.to_string_lossy().into_owned();

    let output = run_deploylat([
        "-w",
        work_items_arg.as_str(),
        "-u",
        "http://127.0.0.1:9/deploy",
    ])?;
    if output.status.success() {
        return Err("Expected failure without a streams file".to_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("MissingStreams") {
        return Err(format!("Unexpected stderr: {}", stderr));
    }
    Ok(())
}

#[test]
fn http_trigger_sends_rendered_request() -> Result<(), String> {
    let broker = spawn_broker()?;
    let spec = TriggerSpec {
        method: HttpMethod::Post,
        url: format!("{}/deploy/{{{{operation}}}}", broker.base_url()),
        body: Some(r#"{"group":"{{group}}","variant":"{{variant}}"}"#.to_owned()),
        headers: vec![("X-Target".to_owned(), "{{target}}".to_owned())],
        timeout: Duration::from_secs(5),
        insecure: false,
    };
    let trigger = HttpTrigger::new(spec).map_err(|err| format!("build trigger: {}", err))?;
    let item = WorkItem::new(
        "gw-9".to_owned(),
        "team-z".to_owned(),
        "op-9".to_owned(),
        "v3".to_owned(),
    );

    run_async_test(async {
        trigger
            .trigger(&item)
            .await
            .map_err(|err| format!("trigger failed: {}", err))
    })?;

    let requests = broker.requests_matching("POST", "/deploy/op-9");
    let [request] = requests.as_slice() else {
        return Err(format!("Expected one request, got {}", requests.len()));
    };
    if request.header("x-target") != Some("gw-9") {
        return Err(format!("Unexpected headers: {:?}", request.headers));
    }
    let body = String::from_utf8_lossy(&request.body);
    if body != r#"{"group":"team-z","variant":"v3"}"# {
        return Err(format!("Unexpected body: {}", body));
    }
    Ok(())
}

#[test]
fn service_bus_subscription_receives_and_completes() -> Result<(), String> {
    let broker = spawn_broker()?;
    let payload = confirmation_payload(CONFIRMATION_KIND, "op-42", "orders-api");
    broker.push_message(payload.clone());

    let source = ServiceBusSource::new(ServiceBusConfig {
        receive_timeout: Duration::from_secs(1),
        ..ServiceBusConfig::default()
    })
    .map_err(|err| format!("build source: {}", err))?;
    let descriptor = StreamDescriptor::new("deployments".to_owned(), broker.connection_string());

    run_async_test(async {
        let mut subscription = source
            .open(&descriptor)
            .await
            .map_err(|err| format!("open failed: {}", err))?;
        let message = subscription
            .receive_next()
            .await
            .map_err(|err| format!("receive failed: {}", err))?
            .ok_or_else(|| "Expected a message".to_owned())?;
        if message.payload.as_ref() != payload.as_slice() {
            return Err("Payload changed in transit".to_owned());
        }
        if message.receipt.is_none() {
            return Err("Expected a lock receipt".to_owned());
        }
        subscription
            .complete(&message)
            .await
            .map_err(|err| format!("complete failed: {}", err))?;
        subscription.close().await;
        Ok(())
    })?;

    let created = broker.requests_matching("PUT", "/deployments/subscriptions/sub-");
    let [create] = created.as_slice() else {
        return Err(format!("Expected one subscription, got {}", created.len()));
    };
    let entry = String::from_utf8_lossy(&create.body);
    if !entry.contains("<AutoDeleteOnIdle>PT1H</AutoDeleteOnIdle>") {
        return Err(format!("Unexpected subscription entry: {}", entry));
    }
    if broker.requests_matching("DELETE", "/messages/1/lock").len() != 1 {
        return Err("Expected the message to be completed".to_owned());
    }
    if broker.requests_matching("DELETE", "?api-version=").len() != 1 {
        return Err("Expected the subscription to be deleted".to_owned());
    }
    Ok(())
}
