pub mod health;
pub mod jobs;
pub mod model;
pub mod predict;
pub mod statics;
