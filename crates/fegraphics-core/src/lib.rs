//! Core abstractions for fegraphics-rs.
//!
//! This crate provides the types shared by every layer of the graphics pipeline:
//! - [`Field`] handles and [`FieldModule`] evaluation
//! - [`FeRegion`] mesh access and topological criteria
//! - Change logs used to propagate region edits to graphics
//! - Selection sets and element point sampling layouts
//! - Configuration [`Options`]
//! - [`MemoryRegion`], an in-memory region implementing both traits

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Mesh counts and xi divisions are small; float/int casts are intentional
#![allow(clippy::cast_precision_loss)]

pub mod change;
pub mod error;
pub mod field;
pub mod id;
pub mod memory;
pub mod options;
pub mod region;
pub mod sampling;
pub mod selection;

pub use change::{ChangeFlags, ChangeLog, RegionChanges};
pub use error::{GraphicsError, Result};
pub use field::{same_field, CoordinateSystem, Field, FieldDescription, FieldId, ValueType};
pub use id::{ElementId, Location, NodeDomain, NodeId};
pub use memory::MemoryRegion;
pub use options::{Options, RebuildPolicy};
pub use region::{CacheGuard, FaceType, FeRegion, FieldModule, FieldWrap, ParentRef};
pub use sampling::XiSamplingMode;
pub use selection::{ElementPointRangesIdentifier, MultiRange, SelectionSet};
