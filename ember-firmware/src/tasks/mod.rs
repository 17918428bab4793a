//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod console_rx;
pub mod console_tx;
pub mod control;
pub mod heartbeat;
pub mod zero_cross;

pub use console_rx::console_rx_task;
pub use console_tx::console_tx_task;
pub use control::control_task;
pub use heartbeat::heartbeat_task;
pub use zero_cross::zero_cross_task;
