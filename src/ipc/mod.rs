//! IPC listener that accepts commands over a Unix socket.
//!
//! Voice-command frontends and key-bind helpers connect to the socket
//! and send newline-delimited JSON commands.

pub mod listener;
