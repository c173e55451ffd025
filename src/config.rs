const DEFAULT_JITTER_PX: f32 = 10.0;
const DEFAULT_SWIPE_MIN_DISTANCE_PX: f32 = 50.0;
const DEFAULT_SWIPE_MAX_DURATION_MS: u64 = 1_000;
const DEFAULT_LONG_PRESS_MS: u64 = 500;
const DEFAULT_TAP_MAX_DURATION_MS: u64 = 1_000;
const DEFAULT_DOUBLE_TAP_WINDOW_MS: u64 = 300;
const DEFAULT_DOUBLE_TAP_RADIUS_PX: f32 = 50.0;
const DEFAULT_PINCH_SCALE_THRESHOLD: f32 = 0.2;
const DEFAULT_ROTATE_THRESHOLD_DEG: f32 = 15.0;

/// Thresholds for the single-contact classifier.
#[derive(Clone, Copy, Debug)]
pub struct SingleContactConfig {
    /// Maximum travel still considered stationary for tap/long-press.
    pub jitter_px: f32,
    pub swipe_min_distance_px: f32,
    pub swipe_max_duration_ms: u64,
    pub long_press_ms: u64,
    pub tap_max_duration_ms: u64,
    /// Measured from the previous tap's release to this tap's release.
    pub double_tap_window_ms: u64,
    pub double_tap_radius_px: f32,
}

impl Default for SingleContactConfig {
    fn default() -> Self {
        Self {
            jitter_px: DEFAULT_JITTER_PX,
            swipe_min_distance_px: DEFAULT_SWIPE_MIN_DISTANCE_PX,
            swipe_max_duration_ms: DEFAULT_SWIPE_MAX_DURATION_MS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            tap_max_duration_ms: DEFAULT_TAP_MAX_DURATION_MS,
            double_tap_window_ms: DEFAULT_DOUBLE_TAP_WINDOW_MS,
            double_tap_radius_px: DEFAULT_DOUBLE_TAP_RADIUS_PX,
        }
    }
}

/// Thresholds for the two-contact classifier.
#[derive(Clone, Copy, Debug)]
pub struct MultiContactConfig {
    /// Minimum `|scale - 1|` before a pinch is reported.
    pub pinch_scale_threshold: f32,
    pub rotate_threshold_deg: f32,
}

impl Default for MultiContactConfig {
    fn default() -> Self {
        Self {
            pinch_scale_threshold: DEFAULT_PINCH_SCALE_THRESHOLD,
            rotate_threshold_deg: DEFAULT_ROTATE_THRESHOLD_DEG,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureConfig {
    pub single: SingleContactConfig,
    pub multi: MultiContactConfig,
}
