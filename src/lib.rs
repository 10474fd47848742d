// Library root
// -----------
// This crate exposes the pieces of the interactive package CLI. The binary
// (`main.rs`) wires them together and runs the session loop.
//
// Module responsibilities:
// - `dispatcher`: the session loop, `last_command` replay and command routing.
// - `purchase`: the auto-buy retry loop and its policy/result types.
// - `command`, `session`, `profile`: the domain types and collaborator traits.
// - `api`, `handlers`: the gateway-backed implementations of those traits.
// - `prompt`, `cancel`, `ui`: operator input, Ctrl+C handling and rendering.
// - `config`, `logging`, `error`: environment settings, tracing, error taxonomy.
pub mod api;
pub mod cancel;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod profile;
pub mod prompt;
pub mod purchase;
pub mod session;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_utils;
