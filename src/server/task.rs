use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::constants::limits;
use crate::error::Error;
use crate::request::Request;
use crate::server::Shared;

// The accept loop. An admission permit is taken *before* accept so that the
// listener stalls instead of accepting sockets it cannot serve; the permit
// travels with the session task and is released when the task drops it.
pub(crate) struct AcceptTask {
    listener: TcpListener,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    admission: Arc<Semaphore>,
}

impl AcceptTask {
    pub(crate) fn new(
        listener: TcpListener,
        shared: Arc<Shared>,
        shutdown: CancellationToken,
        admission: Arc<Semaphore>,
    ) -> Self {
        Self {
            listener,
            shared,
            shutdown,
            admission,
        }
    }

    pub(crate) async fn run(self) {
        let mut sessions = JoinSet::new();

        loop {
            let permit = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                permit = self.admission.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (socket, addr) = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.listener.accept() => match result {
                    Ok(accepted) => accepted,
                    Err(err) => {
                        drop(permit);
                        self.shared.report(&Error::Io(err.kind()));
                        tracing::error!("error accepting connection: {}", err);
                        continue;
                    }
                },
            };

            let active = self.shared.active.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!("new connection from {} ({} active)", addr, active);

            let session = SessionTask::new(socket, self.shared.clone(), self.shutdown.clone(), permit);
            sessions.spawn(
                session
                    .run()
                    .instrument(tracing::info_span!("session", "remote" = ?addr)),
            );
        }

        tracing::info!("server shutdown");
        while sessions.join_next().await.is_some() {}
    }
}

// One task per accepted connection. Requests are answered strictly in
// order; the loop never reads the next request before the previous response
// has been written.
struct SessionTask {
    socket: TcpStream,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
    _permit: OwnedSemaphorePermit,
}

impl SessionTask {
    fn new(
        socket: TcpStream,
        shared: Arc<Shared>,
        shutdown: CancellationToken,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        Self {
            socket,
            shared,
            shutdown,
            _permit: permit,
        }
    }

    async fn run(mut self) {
        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let mut buffer = vec![0u8; limits::READ_BUFFER_SIZE];
            let count = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.socket.read(&mut buffer) => match result {
                    Ok(0) => {
                        tracing::info!("connection closed by peer");
                        break;
                    }
                    Ok(count) => count,
                    Err(err) => {
                        self.shared.report(&Error::Io(err.kind()));
                        tracing::warn!("read failed: {}", err);
                        break;
                    }
                },
            };

            // the request takes ownership of its own copy of the frame; the
            // read buffer is never retained across iterations
            let frame = buffer[..count].to_vec();

            let request = match Request::parse(frame) {
                Ok(request) => request,
                Err(err) => {
                    self.shared.report(&err);
                    tracing::warn!("parse failed: {}", err);
                    continue;
                }
            };

            let response = match self.shared.dispatch(&request) {
                Ok(response) => response,
                Err(err) => {
                    self.shared.report(&err);
                    tracing::warn!("dispatch failed: {}", err);
                    continue;
                }
            };

            if let Err(err) = self.socket.write_all(&response).await {
                self.shared.report(&Error::Io(err.kind()));
                tracing::warn!("write failed: {}", err);
                break;
            }
        }

        let active = self.shared.active.fetch_sub(1, Ordering::Relaxed) - 1;
        tracing::info!("session ended ({} active)", active);
        // dropping self closes the socket and releases the admission permit
    }
}
