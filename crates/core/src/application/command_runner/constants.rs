// Command runner constants (no magic values)
use std::time::Duration;

/// Delay between two polls of a non-terminal process (2s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
