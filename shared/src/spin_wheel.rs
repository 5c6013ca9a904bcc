use serde::{Serialize, Deserialize};

/// Wall-clock cooldown between spins, in seconds (24 hours).
pub const SPIN_COOLDOWN_SECS: i64 = 86_400;

/// Spins on consecutive days keep the streak alive; a gap longer than this
/// (measured from the previous spin) resets it.
pub const STREAK_RESET_SECS: i64 = 172_800;

/// Streak length at which the reward doubles.
pub const STREAK_DOUBLE_THRESHOLD: i32 = 100;

/// Fixed settle time of the wheel animation in milliseconds. The reward is
/// revealed only after this elapses, even though it resolves earlier.
pub const SPIN_SETTLE_MS: u32 = 4_000;

/// Client-side deadline for the reward call so a hung request cannot leave
/// the wheel spinning forever.
pub const SPIN_NETWORK_TIMEOUT_MS: u32 = 15_000;

/// Observed base reward range handed out by the server, in reward units.
pub const BASE_REWARD_MIN: i64 = 1;
pub const BASE_REWARD_MAX: i64 = 10;

/// Full turns added per spin: between 5 and 8, plus a random final offset.
pub const MIN_FULL_TURNS: f64 = 5.0;
pub const EXTRA_TURN_SPREAD: f64 = 3.0;

/// Currency a spin pays out in. TIV amounts are credits, USD amounts are
/// cents.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Tiv,
    Usd,
}

impl RewardKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tiv => "TIV",
            Self::Usd => "USD cents",
        }
    }
}

// === API types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct SpinStatusResponse {
    pub can_spin: bool,
    pub cooldown_seconds: i64,
    pub streak: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpinRequest {
    pub timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpinResponse {
    pub success: bool,
    pub base_reward: i64,
    pub final_reward: i64,
    pub doubled: bool,
    pub reward_type: RewardKind,
    pub streak: i32,
    pub new_tiv_balance: i64,
    pub new_usd_cents: i64,
    pub message: Option<String>,
    pub cooldown_seconds: i64,
}

// === Pure rules ===

/// The one streak rule: 100 consecutive qualifying days doubles the payout.
pub fn streak_multiplier(streak: i32) -> i64 {
    if streak >= STREAK_DOUBLE_THRESHOLD { 2 } else { 1 }
}

pub fn apply_streak_bonus(base_reward: i64, streak: i32) -> i64 {
    base_reward * streak_multiplier(streak)
}

/// Remaining cooldown given the age of the newest spin record. `None` means
/// the user has never spun, which is always eligible.
pub fn cooldown_remaining(seconds_since_last: Option<i64>) -> i64 {
    match seconds_since_last {
        Some(age) => (SPIN_COOLDOWN_SECS - age).max(0),
        None => 0,
    }
}

/// Whole hours until the next spin, rounded up.
pub fn hours_until_next_spin(cooldown_seconds: i64) -> i64 {
    (cooldown_seconds + 3599) / 3600
}

pub fn cooldown_message(cooldown_seconds: i64) -> String {
    let hours = hours_until_next_spin(cooldown_seconds);
    if hours == 1 {
        "Next spin available in 1 hour".to_string()
    } else {
        format!("Next spin available in {} hours", hours)
    }
}

/// Degrees added to the rotation accumulator for one spin. Callers pass two
/// unit randoms; the result is always 5 to 9 full forward turns, so the
/// wheel never appears to rewind.
pub fn spin_extra_degrees(r1: f64, r2: f64) -> f64 {
    (MIN_FULL_TURNS + r1 * EXTRA_TURN_SPREAD) * 360.0 + r2 * 360.0
}

/// Client-local visual state of the wheel. Created on mount, discarded on
/// navigation; nothing in here is durable or balance-affecting.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelState {
    pub rotation_degrees: f64,
    pub spinning: bool,
    pub can_spin: bool,
    pub cooldown_message: String,
}

impl WheelState {
    pub fn new() -> Self {
        Self {
            rotation_degrees: 0.0,
            spinning: false,
            can_spin: false,
            cooldown_message: String::new(),
        }
    }

    /// Applies a status lookup. A lookup that found no history (or failed)
    /// maps to `can_spin = true` upstream; this only records the outcome.
    pub fn apply_status(&mut self, can_spin: bool, cooldown_seconds: i64) {
        self.can_spin = can_spin;
        self.cooldown_message = if can_spin {
            String::new()
        } else {
            cooldown_message(cooldown_seconds)
        };
    }

    /// Claims the spin. Returns false without any state change when a spin
    /// is already in flight or the gate is closed, so rapid re-triggering
    /// is a no-op and the resolver runs at most once per cycle.
    pub fn begin_spin(&mut self) -> bool {
        if self.spinning || !self.can_spin {
            return false;
        }
        self.spinning = true;
        true
    }

    /// Advances the rotation accumulator once the reward has resolved. The
    /// accumulator only ever grows, so the wheel always animates forward.
    pub fn drive(&mut self, extra_degrees: f64) {
        if self.spinning && extra_degrees > 0.0 {
            self.rotation_degrees += extra_degrees;
        }
    }

    /// Wheel settled after a successful spin: lock the gate immediately
    /// rather than waiting for a fresh server round-trip.
    pub fn settle(&mut self, cooldown_seconds: i64) {
        self.spinning = false;
        self.can_spin = false;
        self.cooldown_message = cooldown_message(cooldown_seconds);
    }

    /// Spin aborted (resolver failure). The gate is left as-is so the next
    /// mount-time recheck can correct it.
    pub fn abort(&mut self) {
        self.spinning = false;
    }
}

impl Default for WheelState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small deterministic unit-random sequence for the rotation tests.
    struct Lcg(u64);

    impl Lcg {
        fn next_unit(&mut self) -> f64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    #[test]
    fn test_cooldown_enforcement() {
        // 10 hours since the last spin: 14 hours left, gate closed.
        let remaining = cooldown_remaining(Some(10 * 3600));
        assert_eq!(remaining, 14 * 3600);
        assert_eq!(hours_until_next_spin(remaining), 14);
        assert_eq!(cooldown_message(remaining), "Next spin available in 14 hours");

        // Partial hours round up.
        assert_eq!(hours_until_next_spin(3601), 2);
        assert_eq!(hours_until_next_spin(1), 1);
        assert_eq!(cooldown_message(3599), "Next spin available in 1 hour");

        // Past the window the remainder clamps to zero.
        assert_eq!(cooldown_remaining(Some(SPIN_COOLDOWN_SECS)), 0);
        assert_eq!(cooldown_remaining(Some(SPIN_COOLDOWN_SECS + 5000)), 0);
    }

    #[test]
    fn test_first_time_user_is_eligible() {
        assert_eq!(cooldown_remaining(None), 0);
    }

    #[test]
    fn test_streak_multiplier() {
        for streak in 0..STREAK_DOUBLE_THRESHOLD {
            assert_eq!(apply_streak_bonus(6, streak), 6);
        }
        assert_eq!(apply_streak_bonus(6, 100), 12);
        assert_eq!(apply_streak_bonus(6, 150), 12);
        assert_eq!(apply_streak_bonus(BASE_REWARD_MAX, 365), 20);
    }

    #[test]
    fn test_single_spin_in_flight() {
        let mut wheel = WheelState::new();
        wheel.apply_status(true, 0);

        assert!(wheel.begin_spin());
        wheel.drive(2000.0);
        let rotation = wheel.rotation_degrees;

        // Re-triggering while spinning must not claim a second resolver
        // call or move the wheel.
        assert!(!wheel.begin_spin());
        assert!(!wheel.begin_spin());
        assert_eq!(wheel.rotation_degrees, rotation);

        wheel.settle(SPIN_COOLDOWN_SECS);
        assert!(!wheel.spinning);
        assert!(!wheel.can_spin);

        // Gate closed after settling: still a no-op.
        assert!(!wheel.begin_spin());
        assert_eq!(wheel.rotation_degrees, rotation);
    }

    #[test]
    fn test_abort_leaves_gate_untouched() {
        let mut wheel = WheelState::new();
        wheel.apply_status(true, 0);
        assert!(wheel.begin_spin());
        wheel.abort();
        assert!(!wheel.spinning);
        assert!(wheel.can_spin);
        assert!(wheel.cooldown_message.is_empty());
    }

    #[test]
    fn test_rotation_monotonic_and_bounded() {
        let mut rng = Lcg(42);
        let mut wheel = WheelState::new();

        for _ in 0..200 {
            wheel.apply_status(true, 0);
            let before = wheel.rotation_degrees;
            let extra = spin_extra_degrees(rng.next_unit(), rng.next_unit());

            // 5 full turns minimum, strictly under 9.
            assert!(extra >= 1800.0);
            assert!(extra < 3240.0);

            assert!(wheel.begin_spin());
            wheel.drive(extra);
            assert!(wheel.rotation_degrees > before);
            wheel.settle(SPIN_COOLDOWN_SECS);
        }
    }

    #[test]
    fn test_drive_ignored_when_idle() {
        let mut wheel = WheelState::new();
        wheel.apply_status(true, 0);
        wheel.drive(2000.0);
        assert_eq!(wheel.rotation_degrees, 0.0);
    }

    #[test]
    fn test_example_scenario() {
        // Streak 150, base reward 6 TIV: doubled to 12.
        let base = 6;
        let streak = 150;
        assert_eq!(streak_multiplier(streak), 2);
        assert_eq!(apply_streak_bonus(base, streak), 12);

        let mut wheel = WheelState::new();
        wheel.apply_status(false, cooldown_remaining(Some(10 * 3600)));
        assert!(!wheel.can_spin);
        assert_eq!(wheel.cooldown_message, "Next spin available in 14 hours");
    }
}
