//! Host/device duality.
//!
//! The original engine threads a memory-space type parameter through every
//! entity so that the *same* templated code builds a host solver or a
//! device-backed one. The dense linear-algebra primitives themselves are an
//! external collaborator (see `crate::matrix`/`crate::vector` docs): this
//! module only carries the compile-time marker, it does not own a GPU
//! backend. A `Device`-parameterized solver dispatches through the identical
//! [`crate::matrix::Matrix`]/[`crate::vector::Vector`] capability as `Host`;
//! there is no concrete accelerator wired in, consistent with dense
//! matrix-build/solve being out of this crate's scope.

use std::fmt::Debug;

/// Marker trait for the memory space an entity's storage lives in.
pub trait MemorySpace: Copy + Debug + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Ordinary heap-allocated host memory (the only space this crate actually
/// executes computations in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Host;

impl MemorySpace for Host {
    const NAME: &'static str = "Host";
}

/// Device-resident memory. Carried as a type parameter for embedders that
/// want to mark intent; resolves to the same host computation underneath
/// since no GPU back end is in scope here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Device;

impl MemorySpace for Device {
    const NAME: &'static str = "Device";
}
