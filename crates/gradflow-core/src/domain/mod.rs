/// People, roles, and the person directory contract
pub mod person;

/// Thesis approval workflow domain models
pub mod thesis;

/// Defense scheduling and grading workflow domain models
pub mod defense;

/// Domain events
pub mod events;

/// Repository interfaces
pub mod repository;
