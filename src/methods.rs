//! Method name constants for the full method catalog. The core treats
//! params and results as opaque JSON; these strings are the only place
//! method names are spelled out, so peer facades and tests never
//! hand-write them.

/// Client -> Agent methods (outbound requests).
pub mod client_to_agent {
    pub const INITIALIZE: &str = "initialize";
    pub const AUTHENTICATE: &str = "authenticate";
    pub const SESSION_NEW: &str = "session/new";
    pub const SESSION_LOAD: &str = "session/load";
    pub const SESSION_PROMPT: &str = "session/prompt";
    pub const SESSION_SET_MODE: &str = "session/set_mode";
    pub const SESSION_SET_MODEL: &str = "session/set_model";
    /// Notification, not a request.
    pub const SESSION_CANCEL: &str = "session/cancel";
}

/// Agent -> Client methods (outbound requests).
pub mod agent_to_client {
    pub const FS_READ_TEXT_FILE: &str = "fs/read_text_file";
    pub const FS_WRITE_TEXT_FILE: &str = "fs/write_text_file";
    pub const SESSION_REQUEST_PERMISSION: &str = "session/request_permission";
    pub const TERMINAL_CREATE: &str = "terminal/create";
    pub const TERMINAL_OUTPUT: &str = "terminal/output";
    pub const TERMINAL_RELEASE: &str = "terminal/release";
    pub const TERMINAL_WAIT_FOR_EXIT: &str = "terminal/wait_for_exit";
    pub const TERMINAL_KILL: &str = "terminal/kill";
    /// Notification, not a request.
    pub const SESSION_UPDATE: &str = "session/update";
}
