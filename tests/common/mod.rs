// tests/common/mod.rs
#![allow(dead_code)]

use service_probe::protocol::resp;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Replies a scripted server writes, possibly split into several chunks with
/// a pause between them so the client sees fragmented reads.
pub type Reply = Vec<Vec<u8>>;

pub async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    (listener, addr)
}

/// A single-connection cache server. Each request array is handed to
/// `handler`, whose reply chunks are written back in order. Returns the
/// commands it saw.
pub async fn spawn_cache_server<F>(mut handler: F) -> (SocketAddr, JoinHandle<Vec<Vec<String>>>)
where
    F: FnMut(&[String]) -> Reply + Send + 'static,
{
    let (listener, addr) = bind().await;
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut conn = BufReader::new(stream);
        let mut seen = Vec::new();

        while let Some(args) = read_request(&mut conn).await {
            for chunk in handler(&args) {
                conn.write_all(&chunk).await.expect("write");
                conn.flush().await.expect("flush");
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            seen.push(args);
        }
        seen
    });
    (addr, handle)
}

async fn read_request(conn: &mut BufReader<TcpStream>) -> Option<Vec<String>> {
    let mut header = String::new();
    if conn.read_line(&mut header).await.ok()? == 0 {
        return None;
    }
    let argc: usize = header.trim().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(argc);
    for _ in 0..argc {
        let mut len_line = String::new();
        conn.read_line(&mut len_line).await.ok()?;
        let arg = resp::decode_bulk(&len_line, conn).await.ok()??;
        args.push(String::from_utf8(arg).ok()?);
    }
    Some(args)
}

/// A single-connection SMTP server: sends `greeting`, then answers HELO/EHLO
/// with `hello_reply` and QUIT with a 221. Returns the lines it received.
pub async fn spawn_smtp_server(greeting: &'static [u8], hello_reply: &'static str) -> (SocketAddr, JoinHandle<Vec<String>>) {
    let (listener, addr) = bind().await;
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut conn = BufReader::new(stream);
        let mut seen = Vec::new();

        conn.write_all(greeting).await.expect("greeting");
        loop {
            let mut line = String::new();
            match conn.read_line(&mut line).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let reply = if line.starts_with("QUIT") {
                "221 Bye\r\n"
            } else {
                hello_reply
            };
            seen.push(line.trim_end().to_string());
            if conn.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
        seen
    });
    (addr, handle)
}

/// Sends a ready greeting, reads the client's next line, then hangs up
/// without answering it.
pub async fn spawn_greet_and_hang_up_server() -> SocketAddr {
    let (listener, addr) = bind().await;
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let mut conn = BufReader::new(stream);
            if conn.write_all(b"220 ready\r\n").await.is_ok() {
                let mut line = String::new();
                let _ = conn.read_line(&mut line).await;
            }
        }
    });
    addr
}

/// Accepts one connection and drops it straight away.
pub async fn spawn_closing_server() -> SocketAddr {
    let (listener, addr) = bind().await;
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    addr
}

/// Accepts one connection and never writes to it.
pub async fn spawn_silent_server() -> SocketAddr {
    let (listener, addr) = bind().await;
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(stream);
        }
    });
    addr
}
