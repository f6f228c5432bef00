#![cfg(feature = "api")]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

struct ChildGuard {
    child: Child,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn served_api_expands_posted_configs() {
    let port = allocate_port();
    let addr = format!("127.0.0.1:{port}");
    let _child = spawn_api_process(port);

    wait_for_server(&addr, Duration::from_secs(8));

    let config = std::fs::read_to_string("scenarios/two_day.json").expect("scenario should exist");
    let request = format!("{{\"config\": {config}}}");

    let (status, body) =
        http_request(&addr, "POST", "/preview", &request).expect("/preview request should succeed");
    assert_eq!(status, 200);
    let preview: Value = serde_json::from_str(&body).expect("preview body should be JSON");
    let time: Vec<f64> = preview["time"]
        .as_array()
        .expect("time should be an array")
        .iter()
        .filter_map(Value::as_f64)
        .collect();
    assert_eq!(time, vec![0.0, 3600.0, 86_400.0, 88_200.0, 172_800.0]);
    assert_eq!(preview["warnings"], serde_json::json!([]));

    let (status, body) = http_request(&addr, "POST", "/periods?granularity=day", &request)
        .expect("/periods request should succeed");
    assert_eq!(status, 200);
    let periods: Value = serde_json::from_str(&body).expect("periods body should be JSON");
    let periods = periods.as_array().expect("periods should be an array");
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[1]["startTime"].as_f64(), Some(86_400.0));

    let (status, _) = http_request(&addr, "POST", "/slice?granularity=day&period=5", &request)
        .expect("/slice request should succeed");
    assert_eq!(status, 400);

    let (status, body) = http_request(&addr, "POST", "/validate", &config)
        .expect("/validate request should succeed");
    assert_eq!(status, 200);
    let validation: Value = serde_json::from_str(&body).expect("validate body should be JSON");
    assert_eq!(validation["valid"], Value::Bool(true));
}

fn allocate_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port bind should succeed");
    let port = listener
        .local_addr()
        .expect("local_addr should be available")
        .port();
    drop(listener);
    port
}

fn spawn_api_process(port: u16) -> ChildGuard {
    let child = Command::new(env!("CARGO_BIN_EXE_drivecycle"))
        .args([
            "--config",
            "scenarios/two_day.json",
            "--serve",
            "--port",
            &port.to_string(),
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("drivecycle process should spawn");

    ChildGuard { child }
}

fn wait_for_server(addr: &str, timeout: Duration) {
    let start = Instant::now();
    loop {
        if let Ok((200, _)) = http_request(addr, "GET", "/health", "") {
            return;
        }

        if start.elapsed() >= timeout {
            panic!("timed out waiting for API server on {addr}");
        }

        thread::sleep(Duration::from_millis(50));
    }
}

fn http_request(addr: &str, method: &str, path: &str, body: &str) -> Result<(u16, String), String> {
    let mut stream = TcpStream::connect(addr).map_err(|err| format!("connect: {err}"))?;
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream
        .write_all(request.as_bytes())
        .map_err(|err| format!("write: {err}"))?;

    let mut raw = String::new();
    stream
        .read_to_string(&mut raw)
        .map_err(|err| format!("read: {err}"))?;

    let (head, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| "invalid HTTP response".to_string())?;
    let status_code = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| "missing status code".to_string())?
        .parse::<u16>()
        .map_err(|err| format!("invalid status code: {err}"))?;

    Ok((status_code, body.to_string()))
}
