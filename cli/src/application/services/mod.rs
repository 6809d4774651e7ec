//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports` and never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod allocator;
pub mod availability;
pub mod cleanup;
pub mod compute;
pub mod dns;
pub mod metadata;
pub mod provision;
pub mod readiness;
pub mod saga;
pub mod tunnel;

pub use availability::check_availability;
pub use cleanup::{CleanupReport, CleanupSaga, CleanupStep, StepOutcome, StepReport};
pub use provision::{ProvisionReport, ProvisionStep, ProvisioningSaga};
pub use saga::{Saga, SagaOutcome, run_saga};
