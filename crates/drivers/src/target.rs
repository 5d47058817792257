//! Client for the system under test over its NUL-framed socket protocol.

use std::io::{BufWriter, Write};
use std::net::TcpStream;

use tpcc_core::{QueryResult, ServerState};

use crate::wire::{self, ResponseDecoder, TextTableDecoder};
use crate::{DbClient, Error};

/// Statement used to confirm a fresh connection is alive.
pub const PROBE: &str = "show tables;";

/// One TCP connection to the target database.
pub struct TargetClient<D = TextTableDecoder> {
    host: String,
    port: u16,
    decoder: D,
    stream: Option<TcpStream>,
}

impl TargetClient {
    #[must_use]
    pub const fn new(host: String, port: u16) -> Self {
        Self::with_decoder(host, port, TextTableDecoder)
    }
}

impl<D: ResponseDecoder> TargetClient<D> {
    #[must_use]
    pub const fn with_decoder(host: String, port: u16, decoder: D) -> Self {
        Self {
            host,
            port,
            decoder,
            stream: None,
        }
    }

    fn round_trip(stream: &mut TcpStream, sql: &str) -> std::io::Result<Option<Vec<u8>>> {
        {
            let mut writer = BufWriter::new(&mut *stream);
            wire::write_frame(&mut writer, sql)?;
            writer.flush()?;
        }
        wire::read_frame(stream)
    }
}

impl<D: ResponseDecoder> DbClient for TargetClient<D> {
    fn connect(&mut self) -> ServerState {
        self.close();
        let mut stream = match TcpStream::connect((self.host.as_str(), self.port)) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!(host = %self.host, port = self.port, %err, "failed to connect");
                return ServerState::Down;
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            tracing::debug!(%err, "could not disable nagle");
        }
        match Self::round_trip(&mut stream, PROBE) {
            Ok(Some(frame)) if !wire::frame_text(&frame).is_empty() => {
                tracing::debug!(host = %self.host, port = self.port, "connected");
                self.stream = Some(stream);
                ServerState::Ok
            }
            Ok(_) => {
                tracing::error!(host = %self.host, port = self.port, "empty probe reply");
                ServerState::Down
            }
            Err(err) => {
                tracing::error!(host = %self.host, port = self.port, %err, "probe failed");
                ServerState::Down
            }
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.shutdown(std::net::Shutdown::Both) {
                tracing::debug!(%err, "shutdown on close failed");
            }
            tracing::debug!(host = %self.host, port = self.port, "connection closed");
        }
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult, Error> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(QueryResult::down("not connected").with_sql(sql));
        };
        let result = match Self::round_trip(stream, sql) {
            Ok(Some(frame)) => self.decoder.decode(&frame),
            Ok(None) => {
                tracing::warn!("connection closed by server");
                self.stream = None;
                QueryResult::down("connection closed")
            }
            Err(err) => {
                tracing::error!(%err, sql, "socket error");
                QueryResult::error(err.to_string())
            }
        };
        Ok(result.with_sql(sql))
    }
}
