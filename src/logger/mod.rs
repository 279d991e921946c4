//! Logger module
//!
//! One function per event, written through the global [`writer`]:
//! - server lifecycle and access lines go to the info sink
//! - warnings, handler failures and encoding failures go to the error sink
//!
//! Before [`init`] runs, lines go to stdout/stderr.

pub mod writer;

use crate::config::Config;
use crate::plan::Signature;
use chrono::Local;
use hyper::{Method, StatusCode};
use std::fmt::Display;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn stamp(tag: &str, message: &str) -> String {
    format!(
        "{} [{tag}] {message}",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
    )
}

fn write_info(tag: &str, message: &str) {
    let line = stamp(tag, message);
    match writer::get() {
        Some(w) => w.write_info(&line),
        None => println!("{line}"),
    }
}

fn write_error(tag: &str, message: &str) {
    let line = stamp(tag, message);
    match writer::get() {
        Some(w) => w.write_error(&line),
        None => eprintln!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, routes: usize) {
    write_info("INFO", &format!("Listening on: http://{addr}"));
    if let Some(workers) = config.server.workers {
        write_info("INFO", &format!("Worker threads: {workers}"));
    }
    write_info("INFO", &format!("Routes registered: {routes}"));
    write_info(
        "INFO",
        &format!("Max body size: {} bytes", config.http.max_body_size),
    );
    if let Some(ref path) = config.logging.access_log_file {
        write_info("INFO", &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info("INFO", &format!("Error log: {path}"));
    }
}

pub fn log_route(method: &str, pattern: &str) {
    write_info("ROUTE", &format!("{method} {pattern}"));
}

/// A signature had no precompiled plan and was introspected at first use
pub fn log_introspected_plan(signature: &Signature) {
    write_error(
        "WARN",
        &format!("handler `{signature}` has no precompiled plan, building it by introspection"),
    );
}

/// Handler error without a status; the client only sees a bare 500
pub fn log_request_error(method: &Method, path: &str, err: &(impl Display + ?Sized)) {
    write_error(
        "ERROR",
        &format!("error handling request: '{err}' request: {method} {path}"),
    );
}

pub fn log_encode_error(method: &Method, path: &str, err: &serde_json::Error) {
    write_error(
        "ERROR",
        &format!("json encoding error: {err} request: {method} {path}"),
    );
}

pub fn log_access(method: &Method, path: &str, status: StatusCode, bytes: usize, elapsed_us: u128) {
    write_info(
        "ACCESS",
        &format!(
            "{method} {path} {} {bytes}B {elapsed_us}us",
            status.as_u16()
        ),
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error("ERROR", &format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error("ERROR", message);
}

pub fn log_warning(message: &str) {
    write_error("WARN", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_format() {
        let line = stamp("WARN", "slow path");
        assert!(line.ends_with(" [WARN] slow path"));
        assert_eq!(line.split(' ').next().unwrap().len(), "2026-01-01".len());
    }
}
