//! UDP remote control server
//!
//! One thread owns the socket. It blocks on receive, decodes the
//! datagram, takes the rig gate just long enough to run the handler,
//! then sends any replies with the gate released.

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::message::{Message, MAX_DATAGRAM};
use super::namespace::{Namespace, Reply, ReplyTarget};
use crate::error::RemoteError;
use crate::rig::SharedRig;

/// Create a UDP socket bound to `addr`
pub fn create_socket(addr: SocketAddr) -> Result<UdpSocket, RemoteError> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| RemoteError::BindFailed(e.to_string()))?;

    socket
        .set_reuse_address(true)
        .map_err(|e| RemoteError::BindFailed(e.to_string()))?;

    socket
        .bind(&addr.into())
        .map_err(|e| RemoteError::BindFailed(format!("{}: {}", addr, e)))?;

    Ok(socket.into())
}

/// The remote control thread and its socket
pub struct RemoteServer {
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
    thread_handle: Option<JoinHandle<()>>,
}

impl RemoteServer {
    /// Bind and start serving `namespace`; port 0 picks a free port
    pub fn start(addr: SocketAddr, rig: SharedRig, namespace: Namespace) -> Result<Self, RemoteError> {
        let socket = create_socket(addr)?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| RemoteError::BindFailed(e.to_string()))?;

        let running = Arc::new(AtomicBool::new(true));
        let running_for_loop = running.clone();

        let handle = thread::Builder::new()
            .name("remote".to_string())
            .spawn(move || serve(socket, rig, namespace, running_for_loop))
            .map_err(|e| RemoteError::Thread(e.to_string()))?;

        tracing::info!("Remote control listening on port {}", local_addr.port());

        Ok(Self {
            running,
            local_addr,
            thread_handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the thread and wait for it
    ///
    /// The receive is unbounded, so an empty datagram to our own port
    /// wakes it to notice the flag.
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let mut wake = self.local_addr;
        if wake.ip().is_unspecified() {
            wake.set_ip(match wake.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
            });
        }

        let unspecified = match wake {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0)),
        };

        match UdpSocket::bind(unspecified).and_then(|s| s.send_to(&[], wake)) {
            Ok(_) => {
                if let Some(handle) = self.thread_handle.take() {
                    let _ = handle.join();
                }
            }
            Err(e) => {
                // Leave the thread blocked rather than hang shutdown
                tracing::warn!("Cannot wake remote control thread: {}", e);
                self.thread_handle.take();
            }
        }

        tracing::info!("Remote control stopped");
    }
}

impl Drop for RemoteServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn serve(socket: UdpSocket, rig: SharedRig, namespace: Namespace, running: Arc<AtomicBool>) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    while running.load(Ordering::SeqCst) {
        let (len, source) = match socket.recv_from(&mut buf) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Remote receive error: {}", e);
                continue;
            }
        };

        if !running.load(Ordering::SeqCst) {
            break;
        }

        let msg = match Message::decode(&buf[..len]) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!("Ignoring datagram from {}: {}", source, e);
                continue;
            }
        };

        let replies = {
            let mut rig = rig.lock();
            namespace.dispatch(&mut rig, &msg)
        };

        match replies {
            Some(replies) => {
                for reply in replies {
                    if let Err(e) = send_reply(&socket, source, &reply) {
                        tracing::debug!("{}: {}", msg.path, e);
                    }
                }
            }
            None => tracing::debug!(
                "No method for {} with arguments '{}'",
                msg.path,
                msg.typetags()
            ),
        }
    }
}

fn send_reply(socket: &UdpSocket, source: SocketAddr, reply: &Reply) -> Result<(), RemoteError> {
    let target = match &reply.target {
        ReplyTarget::Sender => source,
        ReplyTarget::Host { host, port } => (host.as_str(), *port)
            .to_socket_addrs()
            .map_err(|e| RemoteError::SendFailed(format!("{}:{}: {}", host, port, e)))?
            .next()
            .ok_or_else(|| RemoteError::SendFailed(format!("{}:{}: no address", host, port)))?,
    };

    reply.message.send_to(socket, target)
}
