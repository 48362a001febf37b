//! Track registry: the published fused-track table.
//!
//! One owning handle with exactly two operations — `publish` (writer, fusion
//! loop only) and `snapshot` (reader, monitor endpoint). The mutex is held
//! across the full write and the full read so subscribers never observe a
//! partial update. No other code reaches into the map.

use crate::types::FusedTrack;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct TrackRegistry {
    tracks: Mutex<HashMap<u32, FusedTrack>>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published entry for the track. Tracks are never removed
    /// during a session.
    pub fn publish(&self, track: FusedTrack) {
        self.tracks
            .lock()
            .expect("track registry mutex poisoned")
            .insert(track.track_id, track);
    }

    /// Copy out all current tracks, ordered by track id.
    pub fn snapshot(&self) -> Vec<FusedTrack> {
        let guard = self.tracks.lock().expect("track registry mutex poisoned");
        let mut tracks: Vec<FusedTrack> = guard.values().cloned().collect();
        tracks.sort_by_key(|t| t.track_id);
        tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;

    fn track(id: u32, lat: f64) -> FusedTrack {
        FusedTrack {
            track_id: id,
            position: GeoPoint::new(lat, 32.9, 1250.0),
            confidence: 0.95,
            source_sensors: vec!["TPS-77-LONG-RANGE".into()],
            uav_reported: None,
            uav_error_m: None,
        }
    }

    #[test]
    fn publish_replaces_previous_entry() {
        let reg = TrackRegistry::new();
        reg.publish(track(1, 39.9));
        reg.publish(track(1, 40.0));
        let snap = reg.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].position.lat, 40.0);
    }

    #[test]
    fn snapshot_is_ordered_and_detached() {
        let reg = TrackRegistry::new();
        reg.publish(track(2, 40.0));
        reg.publish(track(1, 39.9));
        let snap = reg.snapshot();
        assert_eq!(snap.iter().map(|t| t.track_id).collect::<Vec<_>>(), vec![1, 2]);
        // Mutating after snapshot must not affect the copy
        reg.publish(track(1, 41.0));
        assert_eq!(snap[0].position.lat, 39.9);
    }
}
