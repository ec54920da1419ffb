//! Simulation constants and tuning parameters.

/// Physics tick rate (Hz).
pub const TICK_RATE: u32 = 50;

/// Seconds per physics tick.
pub const FIXED_DT: f64 = 1.0 / TICK_RATE as f64;

// --- Atmosphere ---

/// Default air density (kg/m³), dry air at 0 °C.
pub const DEFAULT_AIR_DENSITY: f64 = 1.293;

/// Scale height for the exponential density model (meters).
pub const ATMOSPHERE_SCALE_HEIGHT: f64 = 8_500.0;

// --- Wind effectors ---

/// Exponent applied to radial proximity inside an effector.
pub const EFFECTOR_RADIAL_FALLOFF_EXP: f64 = 1.5;

// --- Border wind ---

/// Upward share of a triggered border correction. Non-physical cushioning
/// heuristic; keep the value unless the flight model is re-tuned.
pub const BORDER_VERTICAL_CUSHION: f64 = 0.5;

/// Default thickness of the border correction band (meters).
pub const BORDER_DEFAULT_SIZE: f64 = 200.0;

/// Default push-back speed at one band-width past the inner boundary (m/s).
pub const BORDER_DEFAULT_WIND_SPEED: f64 = 15.0;

/// Default falloff exponent for border wind.
pub const BORDER_DEFAULT_WIND_POW: f64 = 2.0;

// --- Turbulence ---

/// Altitude below which turbulence runs at half amplitude (meters).
pub const TURBULENCE_MIN_ALTITUDE: f64 = 0.0;

/// Altitude above which turbulence runs at full amplitude (meters).
pub const TURBULENCE_MAX_ALTITUDE: f64 = 500.0;

/// Default extra scale on the vertical turbulence component.
pub const TURBULENCE_VERTICAL_SCALE: f64 = 0.5;

/// Default turbulence seed.
pub const TURBULENCE_DEFAULT_SEED: u64 = 42;

// --- Spatial index ---

/// Entries a node holds before it splits into octants.
pub const OCTREE_NODE_CAPACITY: usize = 8;

/// Default edge length of the root node (meters).
pub const OCTREE_INITIAL_SIZE: f64 = 1_024.0;

/// Nodes never split below this edge length (meters).
pub const OCTREE_MIN_NODE_SIZE: f64 = 8.0;

/// Loose bounds are this multiple of a node's base edge length.
pub const OCTREE_LOOSENESS: f64 = 1.25;

/// Root growth attempts before an insert is rejected.
pub const OCTREE_MAX_GROW_ATTEMPTS: u32 = 24;

// --- Surfaces ---

/// Maximum number of axis responses per wing section.
pub const MAX_AXIS_RESPONSES: usize = 3;

/// Upper bound on wing strip count.
pub const MAX_WING_SECTIONS: usize = 256;

/// Default ground-effect raycast height (meters).
pub const GROUND_EFFECT_DEFAULT_HEIGHT: f64 = 10.0;
