//! Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! Enabled via the `logging` feature; not intended for production use —
//! implement a custom [`Subscriber`] for structured logging or metrics.
//!
//! ## Output format
//! ```text
//! [started] child=worker
//! [failed] child=worker reason="execution failed: boom"
//! [removed] child=worker
//! [shutdown-timeout] child=worker
//! [intensity-exceeded] child=worker
//! [shutdown-requested]
//! [supervisor-stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscriber;

/// Stdout logging subscriber.
pub struct LogWriter;

#[async_trait]
impl Subscriber for LogWriter {
    async fn handle(&self, e: &Event) {
        let child = e.child.as_deref().unwrap_or("?");
        match e.kind {
            EventKind::ChildStarted => println!("[started] child={child}"),
            EventKind::ChildStopped => println!("[stopped] child={child}"),
            EventKind::ChildFailed => {
                println!(
                    "[failed] child={child} reason={:?}",
                    e.reason.as_deref().unwrap_or("")
                );
            }
            EventKind::ChildRemoved => println!("[removed] child={child}"),
            EventKind::ShutdownTimeout => println!("[shutdown-timeout] child={child}"),
            EventKind::IntensityExceeded => println!("[intensity-exceeded] child={child}"),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::SupervisorStopped => println!("[supervisor-stopped]"),
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
