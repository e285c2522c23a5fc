pub mod ask;
pub mod documents;
pub mod liveness;
pub mod readiness;
pub mod upload;
