//! Scripted in-process NNTP server for integration tests
//!
//! Speaks just enough of the protocol to drive the client end to end:
//! greeting, MODE READER, AUTHINFO USER/PASS, GROUP, XOVER, BODY, QUIT.
//! Every received command line is logged for assertions.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

/// One newsgroup the mock server knows about
#[derive(Clone, Default)]
pub struct GroupFixture {
    pub count: u64,
    pub first: u64,
    pub last: u64,
    /// Raw XOVER rows served for any requested range
    pub overview: Vec<String>,
}

/// Behavior of one mock server instance
#[derive(Clone, Default)]
pub struct ServerFixture {
    /// Credentials the server accepts; `None` means AUTHINFO always succeeds
    pub credentials: Option<(String, String)>,
    /// Reject GROUP with 480 until the session has authenticated
    pub group_requires_auth: bool,
    pub groups: HashMap<String, GroupFixture>,
    /// Article bodies by message-id
    pub bodies: HashMap<String, Vec<String>>,
}

pub struct MockServer {
    pub port: u16,
    log: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl MockServer {
    pub async fn start(fixture: ServerFixture) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let log = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let fixture = Arc::new(fixture);

        {
            let log = Arc::clone(&log);
            let connections = Arc::clone(&connections);
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(handle_connection(
                        stream,
                        Arc::clone(&fixture),
                        Arc::clone(&log),
                    ));
                }
            });
        }

        Self {
            port,
            log,
            connections,
        }
    }

    /// Every command line received so far, across all connections
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn commands_matching(&self, prefix: &str) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Number of TCP connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("news://127.0.0.1:{}/{}", self.port, path)
    }
}

async fn handle_connection(
    stream: TcpStream,
    fixture: Arc<ServerFixture>,
    log: Arc<Mutex<Vec<String>>>,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut pending_user: Option<String> = None;
    let mut authed = false;
    let mut current_group: Option<GroupFixture> = None;

    send(&mut write_half, "200 mock NNTP service ready").await;

    let mut line = String::new();
    loop {
        line.clear();
        let Ok(n) = reader.read_line(&mut line).await else {
            break;
        };
        if n == 0 {
            break;
        }
        let command = line.trim_end().to_string();
        log.lock().unwrap().push(command.clone());

        let mut parts = command.splitn(3, ' ');
        let verb = parts.next().unwrap_or("").to_ascii_uppercase();

        match verb.as_str() {
            "MODE" => send(&mut write_half, "200 Reader mode acknowledged").await,
            "AUTHINFO" => {
                let kind = parts.next().unwrap_or("").to_ascii_uppercase();
                let value = parts.next().unwrap_or("").to_string();
                match (kind.as_str(), &fixture.credentials) {
                    ("USER", Some(_)) => {
                        pending_user = Some(value);
                        send(&mut write_half, "381 Password required").await;
                    }
                    ("PASS", Some((user, pass))) => {
                        if pending_user.as_deref() == Some(user.as_str()) && value == *pass {
                            authed = true;
                            send(&mut write_half, "281 Authentication accepted").await;
                        } else {
                            send(&mut write_half, "481 Authentication rejected").await;
                        }
                    }
                    _ => send(&mut write_half, "281 Ok").await,
                }
            }
            "GROUP" => {
                let name = parts.next().unwrap_or("");
                if fixture.group_requires_auth && !authed {
                    send(&mut write_half, "480 Authentication required").await;
                } else if let Some(group) = fixture.groups.get(name) {
                    let status =
                        format!("211 {} {} {} {}", group.count, group.first, group.last, name);
                    send(&mut write_half, &status).await;
                    current_group = Some(group.clone());
                } else {
                    send(&mut write_half, "411 No such newsgroup").await;
                }
            }
            "XOVER" => match &current_group {
                Some(group) => {
                    send(&mut write_half, "224 Overview information follows").await;
                    for row in &group.overview {
                        send_data(&mut write_half, row).await;
                    }
                    send(&mut write_half, ".").await;
                }
                None => send(&mut write_half, "412 No newsgroup selected").await,
            },
            "BODY" => {
                let id = parts.next().unwrap_or("");
                match fixture.bodies.get(id) {
                    Some(body) => {
                        send(&mut write_half, &format!("222 0 {} body follows", id)).await;
                        for body_line in body {
                            send_data(&mut write_half, body_line).await;
                        }
                        send(&mut write_half, ".").await;
                    }
                    None => send(&mut write_half, "430 No such article").await,
                }
            }
            "QUIT" => {
                send(&mut write_half, "205 Goodbye").await;
                break;
            }
            _ => send(&mut write_half, "500 Command not recognized").await,
        }
    }
}

async fn send(writer: &mut OwnedWriteHalf, line: &str) {
    let _ = writer.write_all(format!("{}\r\n", line).as_bytes()).await;
}

/// Payload lines get RFC 3977 dot-stuffing
async fn send_data(writer: &mut OwnedWriteHalf, line: &str) {
    if line.starts_with('.') {
        let _ = writer.write_all(format!(".{}\r\n", line).as_bytes()).await;
    } else {
        send(writer, line).await;
    }
}

/// One XOVER row with the fields the parser cares about filled in
pub fn xover_row(number: u64, subject: &str, message_id: &str, bytes: u64) -> String {
    format!(
        "{}\t{}\tposter@example.com\tMon, 01 Jan 2024 10:00:00 +0000\t{}\t\t{}\t100",
        number, subject, message_id, bytes
    )
}

/// Minimal uuencoder (45-byte lines) for building article bodies
pub fn uu_encode(data: &[u8]) -> Vec<String> {
    data.chunks(45)
        .map(|chunk| {
            let mut line = String::new();
            line.push((chunk.len() as u8 + 32) as char);
            for group in chunk.chunks(3) {
                let b0 = group[0];
                let b1 = group.get(1).copied().unwrap_or(0);
                let b2 = group.get(2).copied().unwrap_or(0);
                for value in [
                    b0 >> 2,
                    ((b0 << 4) | (b1 >> 4)) & 0x3F,
                    ((b1 << 2) | (b2 >> 6)) & 0x3F,
                    b2 & 0x3F,
                ] {
                    line.push((value + 32) as char);
                }
            }
            line
        })
        .collect()
}
