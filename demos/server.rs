//! A small embedding that wires the environment configuration, an in-memory
//! store, a custom function code and an unhandled-request observer together.
//!
//! Configure with `SERVER_ADDRESS`, `STORE_TYPE`, `SQLITE_DSN` and `TIMEOUT`,
//! e.g. `SERVER_ADDRESS=127.0.0.1:5020 cargo run --example server`.

use std::sync::Arc;

use mbserver::config::{Config, StoreType};
use mbserver::{codec, InMemoryStore, Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env();
    if config.store_type == StoreType::Sqlite {
        tracing::warn!(
            "no SQL-backed store is wired into this demo, using the in-memory store \
             (dsn was {:?})",
            config.sqlite_dsn
        );
    }

    let store = Arc::new(InMemoryStore::new());
    let mut server = Server::new(
        store,
        ServerConfig {
            address: config.address.clone(),
            max_connections: 10,
        },
    );

    server.set_coils(vec![1, 0, 1, 0, 0, 0, 0, 0, 1])?;
    server.set_holding_registers(vec![0x1234, 0x5678, 0, 0])?;
    server.set_input_registers(vec![0xCAFE; 4])?;

    // a custom function code that echoes the request payload back
    server.register_custom_handler(
        0x41,
        Arc::new(|request, _store| {
            let mut pdu = vec![request.function()];
            pdu.extend_from_slice(&request.frame()[8..]);
            let header = codec::build_response_header(
                request.transaction_id(),
                0,
                pdu.len() as u16 + 1,
                request.unit_id(),
            );
            let mut response = header.to_vec();
            response.extend_from_slice(&pdu);
            Ok(response)
        }),
    );

    server.on_unhandled_request(Arc::new(|request| {
        tracing::warn!("no handler registered for request: {}", request);
    }));

    server.set_error_sink(Arc::new(|err| {
        tracing::error!("server error: {}", err);
    }));

    server.start().await?;
    tracing::info!(
        "listening on {} (timeout knob for embedders: {:?})",
        server.local_addr().map(|a| a.to_string()).unwrap_or_default(),
        config.timeout
    );

    tokio::signal::ctrl_c().await?;
    server.stop().await;
    Ok(())
}
