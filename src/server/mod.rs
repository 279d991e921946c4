// Server module entry point
// Accept loop that feeds HTTP/1 connections into a serve mux

pub mod connection;
pub mod listener;

pub use connection::{handle_request, ServeSettings};
pub use listener::{create_reusable_listener, ListenerOptions};

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::handler::ServeMux;
use crate::logger;

/// Accept connections forever, serving each one on its own task.
///
/// Accept failures are logged and the loop keeps going.
pub async fn serve(listener: TcpListener, mux: Arc<ServeMux>, settings: ServeSettings) {
    let settings = Arc::new(settings);
    loop {
        match listener.accept().await {
            Ok((stream, _peer_addr)) => {
                connection::handle_connection(stream, Arc::clone(&mux), Arc::clone(&settings));
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}
