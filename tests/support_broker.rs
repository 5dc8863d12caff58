use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

pub const CONFIRMATION_KIND: &str = "DEPLOY_API_IN_GATEWAY";
pub const KEY_NAME: &str = "RootManageSharedAccessKey";
pub const KEY: &str = "c2VjcmV0LWtleQ==";

/// One request as seen by the fake server.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
struct BrokerState {
    requests: Vec<RecordedRequest>,
    pending: VecDeque<Vec<u8>>,
    next_sequence: u64,
}

/// Plays both remote systems: every `POST /deploy/<key>` queues a
/// confirmation for `<key>`, which the Service Bus endpoints then hand out
/// to whichever subscription polls first.
pub struct FakeBroker {
    base_url: String,
    state: Arc<Mutex<BrokerState>>,
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for FakeBroker {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

impl FakeBroker {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn connection_string(&self) -> String {
        format!(
            "Endpoint={}/;SharedAccessKeyName={};SharedAccessKey={}",
            self.base_url, KEY_NAME, KEY
        )
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    pub fn requests_matching(&self, method: &str, path_fragment: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path.contains(path_fragment))
            .collect()
    }

    /// Queues a raw message body for the next receive call.
    pub fn push_message(&self, body: Vec<u8>) {
        if let Ok(mut state) = self.state.lock() {
            state.pending.push_back(body);
        }
    }
}

/// Builds a confirmation document the way the deployment pipeline emits it.
pub fn confirmation_payload(kind: &str, key: &str, name: &str) -> Vec<u8> {
    let inner = serde_json::json!({ "apiId": key, "uuid": key, "name": name });
    let emitted_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or_default();
    serde_json::json!({
        "event": {
            "payloadData": {
                "eventType": kind,
                "timestamp": emitted_at,
                "event": B64.encode(inner.to_string()),
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// Spawn the fake trigger/broker server.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_broker() -> Result<FakeBroker, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let base_url = format!("http://{}", addr);
    let state = Arc::new(Mutex::new(BrokerState::default()));
    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let thread_state = Arc::clone(&state);
    let thread_base = base_url.clone();
    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let state = Arc::clone(&thread_state);
                    let base = thread_base.clone();
                    thread::spawn(move || handle_client(stream, &state, &base));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(_) => break,
            }
        }
    });

    Ok(FakeBroker {
        base_url,
        state,
        shutdown: shutdown_tx,
        thread: Some(handle),
    })
}

fn read_request(stream: &TcpStream) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_owned();
    let path = parts.next()?.to_owned();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_owned(), value.trim().to_owned()));
        }
    }

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn handle_client(mut stream: TcpStream, state: &Mutex<BrokerState>, base_url: &str) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Some(request) = read_request(&stream) else {
        return;
    };
    let response = respond(&request, state, base_url);
    if let Ok(mut state) = state.lock() {
        state.requests.push(request);
    }
    if stream.write_all(&response).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

fn respond(request: &RecordedRequest, state: &Mutex<BrokerState>, base_url: &str) -> Vec<u8> {
    let path = request.path.split('?').next().unwrap_or_default();
    match request.method.as_str() {
        "POST" if path.starts_with("/deploy/") => {
            let key = path.trim_start_matches("/deploy/");
            if let Ok(mut state) = state.lock() {
                state
                    .pending
                    .push_back(confirmation_payload(CONFIRMATION_KIND, key, "orders-api"));
            }
            http_response("200 OK", &[], b"OK")
        }
        "PUT" if path.contains("/subscriptions/") => http_response("201 Created", &[], b""),
        "POST" if path.ends_with("/messages/head") => {
            let next = state.lock().ok().and_then(|mut state| {
                let body = state.pending.pop_front()?;
                state.next_sequence = state.next_sequence.saturating_add(1);
                Some((state.next_sequence, body))
            });
            match next {
                Some((sequence, body)) => {
                    let subscription = path.trim_end_matches("/messages/head");
                    let location =
                        format!("{}{}/messages/{}/lock", base_url, subscription, sequence);
                    http_response("201 Created", &[("Location", location.as_str())], &body)
                }
                None => {
                    thread::sleep(Duration::from_millis(50));
                    http_response("204 No Content", &[], b"")
                }
            }
        }
        "DELETE" => http_response("200 OK", &[], b""),
        _ => http_response("404 Not Found", &[], b""),
    }
}

fn http_response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (key, value) in headers {
        head.push_str(key);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    let mut response = head.into_bytes();
    response.extend_from_slice(body);
    response
}

/// Run the `deploylat` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_deploylat<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = deploylat_bin()?;
    Command::new(bin)
        .args(args)
        .env("DEPLOYLAT_LOG", "error")
        .output()
        .map_err(|err| format!("run deploylat failed: {}", err))
}

fn deploylat_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_deploylat").map_or_else(
        || Err("CARGO_BIN_EXE_deploylat missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
