// src/protocol/mod.rs
pub mod resp;
pub mod smtp;
