// Response validation
//
// One send, one classification: 2xx body, transport failure, or server error.
// Bodies are read as raw bytes; no charset or BOM sniffing is applied.

use reqwest::RequestBuilder;
use std::time::Instant;
use tracing::{debug, warn};

use crate::errors::{FaasError, Result};
use crate::protocol::Operation;

/// Send `request` once and return the body of a 2xx response, byte for byte
pub(crate) async fn send_checked(
    operation: Operation,
    target: Option<&str>,
    request: RequestBuilder,
) -> Result<Vec<u8>> {
    let start = Instant::now();

    let response = match request.send().await {
        Ok(response) => response,
        Err(source) => {
            let elapsed = start.elapsed();
            log_transport_error(operation, target, &source);
            return Err(FaasError::Transport {
                operation,
                target: target.map(str::to_string),
                elapsed,
                source,
            });
        }
    };

    let status = response.status();
    let body = response.bytes().await.map_err(|source| {
        log_transport_error(operation, target, &source);
        FaasError::Transport {
            operation,
            target: target.map(str::to_string),
            elapsed: start.elapsed(),
            source,
        }
    })?;
    let body = body.to_vec();
    let elapsed = start.elapsed();

    if !status.is_success() {
        warn!(
            operation = %operation,
            target = target.unwrap_or("-"),
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Non-successful response"
        );
        return Err(FaasError::Server {
            operation,
            target: target.map(str::to_string),
            status: status.as_u16(),
            body,
            elapsed,
        });
    }

    debug!(
        operation = %operation,
        status = status.as_u16(),
        bytes = body.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Request succeeded"
    );
    Ok(body)
}

/// Control-plane bodies are text; reject anything that is not valid UTF-8
/// rather than rewriting it.
pub(crate) fn into_text(operation: Operation, target: Option<&str>, body: Vec<u8>) -> Result<String> {
    String::from_utf8(body).map_err(|source| FaasError::Decode {
        operation,
        target: target.map(str::to_string),
        source,
    })
}

fn log_transport_error(operation: Operation, target: Option<&str>, e: &reqwest::Error) {
    let kind = if e.is_timeout() {
        "TIMEOUT"
    } else if e.is_connect() {
        "CONNECTION"
    } else if e.is_request() {
        "REQUEST"
    } else if e.is_body() || e.is_decode() {
        "BODY"
    } else {
        "OTHER"
    };
    warn!(
        operation = %operation,
        target = target.unwrap_or("-"),
        kind,
        "HTTP request failed: {}",
        e
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_text_keeps_valid_utf8_unchanged() {
        let body = "\u{feff}[\"sieve\"]".as_bytes().to_vec();
        let text = into_text(Operation::List, None, body.clone()).unwrap();
        assert_eq!(text.as_bytes(), body.as_slice());
    }

    #[test]
    fn test_into_text_rejects_invalid_utf8() {
        let err = into_text(Operation::Logs, None, vec![0xff, 0xfe, 0x00, 0x80]).unwrap_err();
        match err {
            FaasError::Decode { operation, source, .. } => {
                assert_eq!(operation, Operation::Logs);
                assert_eq!(source.into_bytes(), vec![0xff, 0xfe, 0x00, 0x80]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
