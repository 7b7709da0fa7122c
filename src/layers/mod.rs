//! Layered continuous effects.
//!
//! ## Key Types
//!
//! - `ActiveFloatingEffect`: a registered temporary modification
//! - `Layer` / `PtSublayer`: application order
//! - `Duration`: expiry rule, enforced by the `cleanup` hooks
//! - `ProjectedState`: effective characteristics after all layers
//!
//! ## Layer order
//!
//! Control → Type → Color → Ability → P/T set → P/T modify → counters →
//! rules markers. Within a layer, oldest timestamp first.

pub mod cleanup;
pub mod floating;
pub mod projected;
pub mod projector;

pub use floating::{
    ActiveFloatingEffect, Duration, FloatingEffectId, FloatingModification, Layer, Modification,
    PtSublayer,
};
pub use projected::{Characteristics, ProjectedState};
pub use projector::{apply_modification, project, project_with};
