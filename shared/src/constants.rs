pub const NETWORK_ERROR: &str = "Network error. Please try again";
pub const SPIN_FAILED_ERROR: &str = "Failed to spin";
pub const SESSION_EXPIRED_ERROR: &str = "Please log in again";

/// Appended to the reward notification when the streak multiplier applied.
pub const DOUBLED_QUALIFIER: &str = "(Doubled!)";

pub const MAX_CAMPAIGN_TITLE_LENGTH: usize = 80;
pub const MIN_CAMPAIGN_TITLE_LENGTH: usize = 3;
