// HTTP front end for the scheme's decryption, answering with nothing but the
// verdict.
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use log::{debug, error};
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::{
    decode_auto, decrypt, Key, SchemeError, BAD_MAC_STATUS, BAD_PADDING_STATUS, SUCCESS_STATUS,
};

pub const ORACLE_ROUTE: &str = "/oracle";

#[derive(Debug, Clone)]
pub struct OracleRequestHandler {
    key: Key,
}

impl OracleRequestHandler {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    pub fn handle_request(&self, body: &str) -> Response {
        let ciphertext = match decode_auto(body) {
            Ok(c) => c,
            Err(e) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Illegal ciphertext: {e}"),
                )
                    .into_response()
            }
        };

        let response = match decrypt(&ciphertext, &self.key) {
            Ok(_) => (StatusCode::OK, SUCCESS_STATUS.to_string()),
            Err(SchemeError::BadPadding) => (StatusCode::BAD_REQUEST, BAD_PADDING_STATUS.to_string()),
            Err(SchemeError::BadMac) => (StatusCode::FORBIDDEN, BAD_MAC_STATUS.to_string()),
            Err(SchemeError::Length(e)) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        };
        debug!("answered {} for {} byte probe", response.0, ciphertext.len());
        response.into_response()
    }
}

async fn oracle_endpoint(
    State(handler): State<Arc<OracleRequestHandler>>,
    body: String,
) -> Response {
    handler.handle_request(&body)
}

pub fn router(request_handler: OracleRequestHandler) -> Router {
    Router::new()
        .route(ORACLE_ROUTE, post(oracle_endpoint))
        .with_state(Arc::new(request_handler))
}

/// Serves the oracle on an already bound listener until the server fails.
pub async fn serve(listener: TcpListener, request_handler: OracleRequestHandler) -> std::io::Result<()> {
    axum::serve(listener, router(request_handler)).await
}

/// Binds `address`, serves the oracle in the background and returns its URL.
pub async fn spawn_server(
    address: impl ToSocketAddrs,
    request_handler: OracleRequestHandler,
) -> std::io::Result<String> {
    let listener = TcpListener::bind(address).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = serve(listener, request_handler).await {
            error!("oracle server stopped: {e}");
        }
    });
    Ok(format!("http://{addr}{ORACLE_ROUTE}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{encrypt, Encoding, HttpOracle, OracleError, PaddingOracle, Verdict, BLOCK_SIZE, KEY_LEN};

    fn key() -> Key {
        Key::new([0x42; KEY_LEN])
    }

    #[test]
    fn handler_maps_decryption_results_to_statuses() {
        let handler = OracleRequestHandler::new(key());
        let ciphertext = encrypt(b"over http", &key());
        let mut bad_mac = ciphertext.clone();
        bad_mac[1] ^= 0x01;

        let ok = handler.handle_request(&hex::encode(&ciphertext));
        let mac = handler.handle_request(&Encoding::Decimal.encode(&bad_mac));
        let short = handler.handle_request("00ff");
        let garbage = handler.handle_request("not a ciphertext");

        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(mac.status(), StatusCode::FORBIDDEN);
        assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(garbage.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn http_oracle_reads_verdicts_from_server() {
        let url = spawn_server("127.0.0.1:0", OracleRequestHandler::new(key()))
            .await
            .unwrap();
        let ciphertext = encrypt(b"over http", &key());
        let mut bad_mac = ciphertext.clone();
        bad_mac[0] ^= 0x01;
        let mut bad_padding = ciphertext.clone();
        let last = bad_padding.len() - BLOCK_SIZE - 1;
        bad_padding[last] ^= 0xff;

        for encoding in [Encoding::Hex, Encoding::Decimal] {
            let oracle = HttpOracle::new(url.clone(), encoding);
            assert_eq!(oracle.query(&ciphertext).await.unwrap(), Verdict::Success);
            assert_eq!(oracle.query(&bad_mac).await.unwrap(), Verdict::BadMac);
            assert_eq!(
                oracle.query(&bad_padding).await.unwrap(),
                Verdict::BadPadding
            );
        }
    }

    #[tokio::test]
    async fn http_oracle_treats_rejections_as_errors() {
        let url = spawn_server("127.0.0.1:0", OracleRequestHandler::new(key()))
            .await
            .unwrap();
        let oracle = HttpOracle::new(url, Encoding::Hex);

        let result = oracle.query(&[0u8; 20]).await;

        assert!(matches!(result, Err(OracleError::Unavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_http_oracle_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let oracle = HttpOracle::new(format!("http://{addr}{ORACLE_ROUTE}"), Encoding::Hex);

        let result = oracle.query(&[0u8; 32]).await;

        assert!(matches!(result, Err(OracleError::Http(_))));
    }
}
