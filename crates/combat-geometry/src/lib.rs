//! Bounding-box and ray geometry shared by the projectile engine and hit detection.
//!
//! Deliberately has no notion of entities, ticks, or damage — it is the reusable geometry
//! layer the rest of `combat-core` builds on.

pub mod aabb;
pub mod ray;

pub use aabb::{Aabb, HasAabb};
pub use ray::Ray;
