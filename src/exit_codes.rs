//! Exit code constants for the quire CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid quire.yaml, init conflicts)
//! - 2: Validation failure (missing fragments, capability files, usage notes)
//! - 3: Load failure (malformed or unreadable registry/profile)
//! - 4: Reference failure (profile names an unknown artifact or capability)
//! - 5: I/O failure while compiling or flushing output
//! - 6: Document template failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or refused operation.
pub const USER_ERROR: i32 = 1;

/// Validation failure: the resolved plan references missing content.
pub const VALIDATION_FAILURE: i32 = 2;

/// Load failure: a registry or profile document could not be read or parsed.
pub const LOAD_FAILURE: i32 = 3;

/// Reference failure: a profile binds an id absent from the registry.
pub const REFERENCE_FAILURE: i32 = 4;

/// I/O failure: reading fragments or writing output failed.
pub const IO_FAILURE: i32 = 5;

/// Template failure: the document template could not be rendered.
pub const TEMPLATE_FAILURE: i32 = 6;
