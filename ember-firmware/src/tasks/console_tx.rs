//! Console UART transmit task
//!
//! Writes one response per command line:
//!
//! ```text
//! success, reply       →  "<reply>\n"
//! success, no reply    →  (nothing)
//! failure              →  "ERROR <message>\n"
//! ```

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use ember_protocol::line::LINE_TERMINATOR;

use crate::channels::{Response, REPLY_CHANNEL};

/// Console TX task - frames responses
#[embassy_executor::task]
pub async fn console_tx_task(mut tx: BufferedUartTx) {
    info!("Console TX task started");

    loop {
        let response = REPLY_CHANNEL.receive().await;
        if let Err(e) = send_response(&mut tx, &response).await {
            warn!("Failed to send response: {:?}", e);
        }
    }
}

async fn send_response(
    tx: &mut BufferedUartTx,
    response: &Response,
) -> Result<(), embassy_rp::uart::Error> {
    if !response.ok {
        tx.write_all(b"ERROR ").await?;
    }
    if !response.text.is_empty() {
        tx.write_all(response.text.as_bytes()).await?;
    }
    if !response.ok || !response.text.is_empty() {
        tx.write_all(&[LINE_TERMINATOR]).await?;
    }
    tx.flush().await
}
