//! RelNav Environment Abstraction Layer
//!
//! Separates the estimation pipeline from its host environment:
//! - Time (`now()`, `sleep()`, corrected wall clock)
//! - Ephemeris (sun position, sidereal time, local sound speed)
//!
//! The pipeline treats every collaborator here as optional: a missing or
//! failing one degrades the output to nominal constants or the uncorrected
//! local clock, never halting estimation.

mod clock;
mod context;
mod ephemeris;
mod error;
mod tokio_impl;

pub use clock::CorrectedClock;
pub use context::NavContext;
pub use ephemeris::{sound_speed_m_s, CelestialSnapshot, EphemerisProvider, NominalEphemeris};
pub use error::EnvError;
pub use tokio_impl::TokioContext;
