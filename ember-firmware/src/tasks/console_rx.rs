//! Console UART receive task
//!
//! Splits the byte stream into command lines and queues them for the
//! control task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use ember_protocol::{format, LineBuffer};

use crate::channels::{CommandText, Response, COMMAND_CHANNEL, REPLY_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Console RX task - frames command lines
#[embassy_executor::task]
pub async fn console_rx_task(mut rx: BufferedUartRx) {
    info!("Console RX task started");

    let mut lines = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match lines.feed(byte) {
                Ok(Some(line)) => {
                    trace!("Line: {}", line);
                    if let Ok(text) = CommandText::try_from(line) {
                        COMMAND_CHANNEL.send(text).await;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Dropped line: {}", e.message());
                    REPLY_CHANNEL
                        .send(Response {
                            ok: false,
                            text: format::text(e.message()),
                        })
                        .await;
                }
            }
        }
    }
}
