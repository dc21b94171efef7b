mod centroid_tracker;
mod matching;
mod track;

pub use centroid_tracker::{IdentityTracker, TrackerConfig};
pub use matching::{
    AssignmentResult, AssignmentStrategy, distance_matrix, greedy_assignment, linear_assignment,
};
pub use track::Track;
