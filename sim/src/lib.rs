//! `sim` — Producer simulators: UAV trajectory, radar detections, SIGINT hits.

pub mod ground_truth;
pub mod radar_sim;
pub mod sigint_sim;
pub mod uav_sim;

pub use ground_truth::TruthSample;
pub use radar_sim::RadarProducer;
pub use sigint_sim::SigintSimulator;
pub use uav_sim::UavSimulator;
