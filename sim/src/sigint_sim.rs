//! SIGINT hit generator.
//!
//! Emits spectral hits with no position: frequency scattered around the
//! emitter band centre, a slowly climbing received power, and a bearing the
//! receiver cannot resolve better than uniform in this design.

use fusion_core::wire::{Header, SigintHit};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use sensor_models::SigintParams;

pub struct SigintSimulator {
    params: SigintParams,
    rng: ChaCha8Rng,
    freq_dist: Normal<f64>,
    power_dbm: f64,
}

impl SigintSimulator {
    pub fn new(params: SigintParams, seed: u64) -> Self {
        let freq_dist = Normal::new(params.center_freq_mhz, params.freq_spread_mhz)
            .expect("frequency spread must be finite");
        Self {
            power_dbm: params.start_power_dbm,
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            freq_dist,
        }
    }

    /// Produce the next hit. Power performs a small upward random walk.
    pub fn next_hit(&mut self, timestamp_ms: u64) -> SigintHit {
        self.power_dbm += self.rng.gen_range(0.0..10.0);
        SigintHit {
            header: Header {
                timestamp_ms,
                sensor_id: self.params.id.clone(),
            },
            frequency: self.freq_dist.sample(&mut self.rng),
            power: self.power_dbm,
            confidence: self.params.confidence,
            bearing: self.rng.gen_range(0.0..360.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_stay_in_band_and_bearing_range() {
        let mut sim = SigintSimulator::new(SigintParams::default(), 11);
        for i in 0..100u64 {
            let hit = sim.next_hit(i);
            assert!((0.0..360.0).contains(&hit.bearing));
            // 6σ around the 1450 MHz centre
            assert!((hit.frequency - 1450.0).abs() < 30.0);
            assert_eq!(hit.confidence, 0.95);
        }
    }

    #[test]
    fn power_walks_upward() {
        let mut sim = SigintSimulator::new(SigintParams::default(), 11);
        let first = sim.next_hit(0).power;
        let later = (0..20u64).map(|i| sim.next_hit(i).power).last().unwrap();
        assert!(later > first);
    }
}
