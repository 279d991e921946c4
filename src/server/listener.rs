// Listener module
// Binds the TCP listener the accept loop reads from

use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

use crate::config::Config;

/// Socket options applied before `bind`
#[derive(Debug, Clone, Copy)]
pub struct ListenerOptions {
    /// `SO_REUSEPORT`: several processes may accept on the same port
    pub reuse_port: bool,
    /// Pending connection queue length passed to `listen`
    pub backlog: i32,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            reuse_port: true,
            backlog: 1024,
        }
    }
}

impl ListenerOptions {
    pub const fn from_config(config: &Config) -> Self {
        Self {
            reuse_port: config.server.reuse_port,
            backlog: config.server.backlog,
        }
    }

    /// Bind a non-blocking listener; must run inside a Tokio runtime
    pub fn bind(self, addr: SocketAddr) -> std::io::Result<TcpListener> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        if addr.is_ipv6() {
            socket.set_only_v6(false)?;
        }
        socket.set_reuse_address(true)?;
        if self.reuse_port {
            socket.set_reuse_port(true)?;
        }
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        socket.listen(self.backlog)?;

        TcpListener::from_std(socket.into())
    }
}

/// Listener with `SO_REUSEPORT` and `SO_REUSEADDR` and the default backlog
pub fn create_reusable_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    ListenerOptions::default().bind(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_two_listeners_share_a_port() {
        let first = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        let second = create_reusable_listener(addr).unwrap();
        assert_eq!(second.local_addr().unwrap(), addr);
    }

    #[tokio::test]
    async fn test_exclusive_listener_keeps_its_port() {
        let options = ListenerOptions {
            reuse_port: false,
            backlog: 16,
        };
        let first = options.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = first.local_addr().unwrap();

        assert!(options.bind(addr).is_err());
    }

    #[test]
    fn test_options_from_config() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        let options = ListenerOptions::from_config(&cfg);
        assert!(options.reuse_port);
        assert_eq!(options.backlog, 1024);
    }
}
