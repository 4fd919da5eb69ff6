//! Shared checks for the integration suites.

use std::fmt::Debug;

use algoscope_trace::{reconstruct, Fold, Step};

/// Reconstruct every index twice and compare.
pub fn assert_deterministic<S>(steps: &[Step<S::Kind>])
where
    S: Fold + PartialEq + Debug,
{
    for index in 0..steps.len() {
        let first: S = reconstruct(steps, index);
        let second: S = reconstruct(steps, index);
        assert_eq!(first, second, "index {}", index);
    }
}

/// Reconstruct from the last index down to the first, keep every snapshot,
/// then check none of them changed when rebuilt in ascending order.
pub fn assert_no_aliasing<S>(steps: &[Step<S::Kind>])
where
    S: Fold + PartialEq + Debug,
{
    let retained: Vec<(usize, S)> = (0..steps.len())
        .rev()
        .map(|index| (index, reconstruct(steps, index)))
        .collect();
    for (index, snapshot) in retained.into_iter().rev() {
        assert_eq!(reconstruct::<S>(steps, index), snapshot, "index {}", index);
    }
}

/// Install the test subscriber once per binary.
pub fn init_logging() {
    algoscope_logging::init_for_tests();
    tracing::debug!("integration logging ready");
}
