//! Test method discovery.

use minitest_core::Capabilities;

/// Prefix marking a member as a test.
pub const TEST_PREFIX: &str = "test";

/// Lists the test methods reachable on `case`.
///
/// A test is a callable member whose name starts with [`TEST_PREFIX`]. Own
/// members come first, then delegated ones; each name appears once and a
/// non-callable member hides a delegated method of the same name.
#[must_use]
pub fn discover<C: Capabilities + ?Sized>(case: &C) -> Vec<String> {
    case.members()
        .into_iter()
        .filter(|member| member.callable && member.name.starts_with(TEST_PREFIX))
        .map(|member| member.name)
        .collect()
}
