//! Instance id allocation against the live compute inventory.

use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;

use crate::application::ports::ComputePlatform;
use crate::domain::ProvisionError;

/// Picks the lowest id in the reserved range the platform is not using.
///
/// Nothing is reserved: two allocators running concurrently can pick the
/// same id, and the later clone fails on the platform side.
pub struct ResourceIdAllocator<'a, C: ComputePlatform> {
    compute: &'a C,
    range: Range<u32>,
}

impl<'a, C: ComputePlatform> ResourceIdAllocator<'a, C> {
    pub fn new(compute: &'a C, range: Range<u32>) -> Self {
        Self { compute, range }
    }

    /// # Errors
    ///
    /// `Remote` if the inventory cannot be listed, `Exhausted` if every id in
    /// the range is taken.
    pub async fn next(&self) -> Result<u32, ProvisionError> {
        let used: HashSet<u32> = self
            .compute
            .list_instances()
            .await
            .map_err(|e| ProvisionError::remote("list instances", e))?
            .into_iter()
            .collect();
        debug!(in_use = used.len(), "scanning reserved id range");

        self.range
            .clone()
            .find(|id| !used.contains(id))
            .ok_or(ProvisionError::Exhausted {
                start: self.range.start,
                end: self.range.end,
            })
    }
}
