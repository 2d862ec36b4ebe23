//! UDP and TCP endpoints, server-side listening loops, and client-side
//! request/response helpers.
//!
//! Grounded on the teacher's `udp_server`/`tcp_server`/`tcp_conn_handler`
//! trio: a timeout-wrapped UDP receive loop handled sequentially in one
//! task, and a TCP accept loop that spawns one task per connection. The
//! original's `SocketException`/`TimeoutException` pair is represented
//! here by [`AuctionError::Socket`]/[`AuctionError::Timeout`].

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs, UdpSocket};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::codec::{BufferSource, Request, Response};
use crate::dispatcher::dispatch;
use crate::error::{AuctionError, Result};
use crate::store::Store;

/// Largest UDP datagram the client will send; used to size the server's
/// receive buffer one byte over so oversize datagrams are detectable.
pub const UDP_CLIENT_MAX_DATAGRAM: usize = 6001;
/// Client-side UDP receive timeout.
pub const UDP_RECV_TIMEOUT: Duration = Duration::from_secs(5);
/// Server-side accepted-TCP-socket receive timeout.
pub const TCP_SERVER_RECV_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------

/// Runs the UDP query loop until the socket errors out. Every datagram is
/// handled fully before the next `recv_from`, matching the single-worker
/// UDP process this replaces.
pub async fn run_udp_server(socket: UdpSocket, store: Store) -> Result<()> {
    let mut buf = vec![0u8; UDP_CLIENT_MAX_DATAGRAM + 1];
    loop {
        let (len, peer) = socket.recv_from(&mut buf).await?;
        info!("[LOG] Request received from: {peer} (UDP)");
        if len > UDP_CLIENT_MAX_DATAGRAM {
            warn!("oversize UDP datagram from {peer} ({len} bytes), dropping");
            continue;
        }
        let response = decode_and_dispatch(&buf[..len], &store).await;
        let bytes = response.encode();
        if let Err(e) = socket.send_to(&bytes, peer).await {
            warn!("failed to send UDP reply to {peer}: {e}");
        }
    }
}

/// Accepts TCP connections forever, spawning a task per connection. Each
/// task handles exactly one request/response exchange then exits — the
/// task-per-connection analogue of the original's fork-per-connection
/// worker pool.
pub async fn run_tcp_server(listener: TcpListener, store: Store) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("[LOG] Request received from: {peer} (TCP)");
        let store = store.clone();
        tokio::spawn(async move {
            if let Err(e) = timeout(
                TCP_SERVER_RECV_TIMEOUT,
                handle_tcp_connection(stream, &store),
            )
            .await
            .unwrap_or(Err(AuctionError::Timeout))
            {
                warn!("TCP connection from {peer} ended with error: {e}");
            }
        });
    }
}

async fn handle_tcp_connection(mut stream: TcpStream, store: &Store) -> Result<()> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let response = decode_and_dispatch(&buf, store).await;
    let bytes = response.encode();
    stream.write_all(&bytes).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn decode_and_dispatch(buf: &[u8], store: &Store) -> Response {
    let mut src = BufferSource::new(buf);
    match Request::decode(&mut src) {
        Ok(request) => dispatch(request, store).await,
        Err(_) => Response::Err,
    }
}

// ---------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------

/// Sends `request` over UDP to `addr` and waits (bounded by
/// [`UDP_RECV_TIMEOUT`]) for the reply. `addr` is resolved fresh for this
/// connection (`UdpSocket::connect` performs the lookup), matching the
/// original client's per-construction `getaddrinfo` call rather than
/// resolving once up front.
pub async fn send_udp_request(addr: impl ToSocketAddrs, request: &Request) -> Result<Response> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(addr).await?;
    let bytes = request.encode()?;
    if bytes.len() > UDP_CLIENT_MAX_DATAGRAM {
        return Err(AuctionError::ArgumentError(
            "request exceeds the maximum datagram size".into(),
        ));
    }
    socket.send(&bytes).await?;

    let mut buf = vec![0u8; UDP_CLIENT_MAX_DATAGRAM + 1];
    let len = timeout(UDP_RECV_TIMEOUT, socket.recv(&mut buf))
        .await
        .map_err(|_| AuctionError::Timeout)??;

    let mut src = BufferSource::new(&buf[..len]);
    Response::decode(&mut src, request.opcode())
}

/// Opens a fresh TCP connection (resolving `addr` for this connection,
/// as the original re-resolves per `TcpClient` construction), writes the
/// whole request, half-closes the write side, then reads the response
/// until the server closes its end.
pub async fn send_tcp_request(addr: impl ToSocketAddrs, request: &Request) -> Result<Response> {
    let mut stream = TcpStream::connect(addr).await?;
    let bytes = request.encode()?;
    stream.write_all(&bytes).await?;
    stream.shutdown().await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;

    let mut src = BufferSource::new(&buf);
    Response::decode(&mut src, request.opcode())
}

/// Sends `request` over whichever transport the protocol assigns it.
pub async fn send_request(addr: impl ToSocketAddrs, request: &Request) -> Result<Response> {
    if request.is_tcp() {
        send_tcp_request(addr, request).await
    } else {
        send_udp_request(addr, request).await
    }
}
