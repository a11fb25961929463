//! HTTP socket loop
//!
//! One connection at a time on port 80, HTTP/1.1 with `Connection: close`.
//! Requests are parsed with a minimal hand-rolled reader: request line,
//! the Content-Length header, then the body for mutating methods. All
//! actual work happens in [`super::handlers`].

use core::fmt::Write;

use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;
use heapless::String;

use crate::config::ConfigStore;
use crate::platform::traits::FlashInterface;
use crate::sensor::SensorMonitor;
use crate::{log_info, log_warn};

use super::handlers::{
    handle_patch_device_info, handle_post_ap_config, render_device_info, render_network_status,
    render_root, ApiError,
};

const HTTP_PORT: u16 = 80;
const MAX_REQUEST_SIZE: usize = 1024;
const MAX_BODY_SIZE: usize = 512;

/// Accept loop. Never returns; socket errors close the connection and the
/// loop re-listens.
pub async fn serve<F: FlashInterface>(
    stack: Stack<'static>,
    store: &'static ConfigStore<F>,
    monitor: &'static SensorMonitor,
) -> ! {
    let mut rx_buffer = [0u8; MAX_REQUEST_SIZE];
    let mut tx_buffer = [0u8; MAX_REQUEST_SIZE];

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(10)));

        if let Err(e) = socket.accept(HTTP_PORT).await {
            log_warn!("HTTP accept failed: {:?}", e);
            continue;
        }

        if let Err(e) = handle_connection(&mut socket, store, monitor).await {
            log_warn!("HTTP connection error: {:?}", e);
        }

        socket.close();
        // Let the peer see the FIN before the socket is reused
        let _ = socket.flush().await;
    }
}

async fn handle_connection<F: FlashInterface>(
    socket: &mut TcpSocket<'_>,
    store: &ConfigStore<F>,
    monitor: &SensorMonitor,
) -> Result<(), embassy_net::tcp::Error> {
    let mut buf = [0u8; MAX_REQUEST_SIZE];
    let mut total = 0usize;

    // Read until end of headers or the buffer fills
    loop {
        let n = socket.read(&mut buf[total..]).await?;
        if n == 0 {
            if total == 0 {
                return Ok(());
            }
            break;
        }
        total += n;
        if total >= MAX_REQUEST_SIZE {
            break;
        }
        if buf[..total].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let (method, path, header_end, content_length) = {
        let req = match core::str::from_utf8(&buf[..total]) {
            Ok(req) => req,
            Err(_) => {
                return write_error(socket, "400 Bad Request", "request is not valid UTF-8").await
            }
        };

        let mut parts = req.lines().next().unwrap_or("").split_whitespace();
        let mut method: String<8> = String::new();
        for ch in parts.next().unwrap_or("").chars().take(8) {
            let _ = method.push(ch);
        }
        let mut path: String<64> = String::new();
        for ch in parts.next().unwrap_or("").chars().take(64) {
            let _ = path.push(ch);
        }

        let header_end = match req.find("\r\n\r\n") {
            Some(idx) => idx + 4,
            None => return write_error(socket, "400 Bad Request", "malformed headers").await,
        };

        const CONTENT_LENGTH: &str = "content-length:";
        let mut content_length = 0usize;
        for line in req[..header_end].lines().skip(1) {
            let line = line.trim();
            if line.len() >= CONTENT_LENGTH.len()
                && line[..CONTENT_LENGTH.len()].eq_ignore_ascii_case(CONTENT_LENGTH)
            {
                if let Ok(len) = line[CONTENT_LENGTH.len()..].trim().parse::<usize>() {
                    content_length = len.min(MAX_BODY_SIZE);
                }
            }
        }

        (method, path, header_end, content_length)
    };

    // Pull in the rest of the body for mutating methods
    if (method.as_str() == "POST" || method.as_str() == "PATCH") && content_length > 0 {
        while total < header_end + content_length && total < MAX_REQUEST_SIZE {
            let n = socket.read(&mut buf[total..]).await?;
            if n == 0 {
                break;
            }
            total += n;
        }
        if total < header_end + content_length {
            return write_error(socket, "400 Bad Request", "truncated body").await;
        }
    }

    let body_end = (header_end + content_length).min(total);
    let body_str = core::str::from_utf8(&buf[header_end..body_end]).unwrap_or("");

    log_info!("{} {}", method.as_str(), path.as_str());

    let mut body: String<MAX_BODY_SIZE> = String::new();
    match (method.as_str(), path.as_str()) {
        ("GET", "/") => {
            if render_root(&mut body, monitor).is_err() {
                return write_error(socket, "500 Internal Server Error", "response too large")
                    .await;
            }
            write_response(socket, "200 OK", &body).await
        }
        ("GET", "/api/device/info") => {
            if render_device_info(&mut body, store).is_err() {
                return write_error(socket, "500 Internal Server Error", "response too large")
                    .await;
            }
            write_response(socket, "200 OK", &body).await
        }
        ("GET", "/api/network/status") => {
            if render_network_status(&mut body, store).is_err() {
                return write_error(socket, "500 Internal Server Error", "response too large")
                    .await;
            }
            write_response(socket, "200 OK", &body).await
        }
        ("PATCH", "/api/device/info") => {
            respond_to_update(socket, handle_patch_device_info(body_str, store)).await
        }
        ("POST", "/api/network/ap/set") => {
            respond_to_update(socket, handle_post_ap_config(body_str, store)).await
        }
        _ => write_error(socket, "404 Not Found", "not found").await,
    }
}

async fn respond_to_update(
    socket: &mut TcpSocket<'_>,
    result: Result<(), ApiError>,
) -> Result<(), embassy_net::tcp::Error> {
    match result {
        Ok(()) => write_response(socket, "200 OK", r#"{"ok":true}"#).await,
        Err(ApiError::BadRequest(msg)) => write_error(socket, "400 Bad Request", msg).await,
        Err(ApiError::Internal) => {
            write_error(socket, "500 Internal Server Error", "failed to persist").await
        }
    }
}

async fn write_error(
    socket: &mut TcpSocket<'_>,
    status: &str,
    message: &str,
) -> Result<(), embassy_net::tcp::Error> {
    let mut body: String<MAX_BODY_SIZE> = String::new();
    body.push_str("{\"error\":").ok();
    super::json::write_json_string(&mut body, message).ok();
    body.push('}').ok();
    write_response(socket, status, &body).await
}

async fn write_response(
    socket: &mut TcpSocket<'_>,
    status: &str,
    body: &str,
) -> Result<(), embassy_net::tcp::Error> {
    let mut head: String<256> = String::new();
    let _ = write!(
        &mut head,
        "HTTP/1.1 {}\r\n\
         Content-Type: application/json; charset=utf-8\r\n\
         Connection: close\r\n\
         Content-Length: {}\r\n\
         \r\n",
        status,
        body.len()
    );
    socket.write(head.as_bytes()).await?;
    socket.write(body.as_bytes()).await?;
    socket.flush().await?;
    Ok(())
}
