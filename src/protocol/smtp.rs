// src/protocol/smtp.rs
//
// The small slice of SMTP the mail relay probe speaks: read the greeting,
// say hello, quit.

/// Reply code a relay sends when it is ready to accept a session.
pub const READY: &str = "220";

/// First three characters of a reply line, if it has that many.
pub fn reply_code(line: &str) -> Option<&str> {
    line.get(..3)
}

pub fn is_ready(line: &str) -> bool {
    reply_code(line) == Some(READY)
}

pub fn hello(domain: &str) -> Vec<u8> {
    format!("HELO {}\r\n", domain).into_bytes()
}

pub fn quit() -> Vec<u8> {
    b"QUIT\r\n".to_vec()
}
