pub mod agent;
pub mod area;
pub mod attitude;
pub mod checkpoint;
pub mod collision;
pub mod config;
pub mod episode;
pub mod flight;
pub mod path;
pub mod physics;
pub mod policy;
pub mod recovery;
pub mod rng;
pub mod scenario;
pub mod simulation;
pub mod snapshot;
