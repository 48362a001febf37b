//! Radar detection physics.
//!
//! Pure functions used by radar producers to decide whether a detection is
//! even produced: aspect-dependent radar cross-section, inverse-fourth-power
//! signal strength, ITU-style rain attenuation and Doppler shift.

use crate::geo;

/// Speed of light, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Nose-on RCS of a small UAV, m².
const RCS_FRONTAL: f64 = 0.1;
/// Broadside RCS of a small UAV, m².
const RCS_BROADSIDE: f64 = 2.0;

/// Aspect-dependent radar cross-section of a small UAV, m².
///
/// Let α be the absolute difference between the target's heading and the
/// bearing from the radar to the target. Nose-on (α ≈ 0) presents the small
/// frontal cross-section, broadside (α ≈ 90°) the large one:
/// `0.1·cos²α + 2.0·sin²α`.
pub fn aspect_rcs(
    uav_lat: f64,
    uav_lon: f64,
    uav_heading_deg: f64,
    radar_lat: f64,
    radar_lon: f64,
) -> f64 {
    let bearing_to_uav = geo::bearing(radar_lat, radar_lon, uav_lat, uav_lon);
    let alpha = (uav_heading_deg - bearing_to_uav).abs().to_radians();
    RCS_FRONTAL * alpha.cos().powi(2) + RCS_BROADSIDE * alpha.sin().powi(2)
}

/// Received signal strength for a monostatic radar: `rcs / range⁴`.
///
/// Unnormalized — compare against a sensitivity threshold in the same units.
pub fn signal_strength(rcs: f64, range_m: f64) -> f64 {
    rcs / range_m.powi(4)
}

/// Two-way rain attenuation in dB over `range_km`, ITU-style power law
/// `A = 2·k·R^α·d` with S-band coefficients.
///
/// Rain rates below 0.1 mm/h attenuate nothing. A production variant would
/// accept a band-keyed coefficient table; these constants are the S-band row.
pub fn rain_attenuation(_freq_ghz: f64, range_km: f64, rain_rate_mm_h: f64) -> f64 {
    if rain_rate_mm_h < 0.1 {
        return 0.0;
    }
    const K: f64 = 7.5e-6;
    const ALPHA: f64 = 0.63;
    2.0 * K * rain_rate_mm_h.powf(ALPHA) * range_km
}

/// Two-way Doppler shift in Hz: `2·v_radial·f_c / c`.
pub fn doppler_shift(range_rate_m_s: f64, carrier_hz: f64) -> f64 {
    2.0 * range_rate_m_s * carrier_hz / SPEED_OF_LIGHT
}
