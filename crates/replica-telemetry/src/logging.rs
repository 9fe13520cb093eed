//! Structured logging helpers.
//!
//! Every replica log line carries the subsystem and instance id so logs from
//! parallel instances can be separated downstream.

/// Log an event scoped to one consensus instance.
///
/// ```rust,ignore
/// log_instance_event!(info, "checkpoints", instance_id, "Checkpoint stabilized", h = 10);
/// ```
#[macro_export]
macro_rules! log_instance_event {
    ($level:ident, $subsystem:expr, $instance_id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            instance_id = %$instance_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an event about a peer message for one instance.
#[macro_export]
macro_rules! log_peer_event {
    ($level:ident, $subsystem:expr, $instance_id:expr, $sender:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            instance_id = %$instance_id,
            sender = %$sender,
            $($($field)*,)?
            $msg
        )
    };
}
