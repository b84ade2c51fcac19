// Copyright 2026 Stratum Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared infrastructure: task scheduling and background loop utilities

pub mod pausable_loop;
pub mod scheduler;

pub use pausable_loop::PausableLoopThread;
pub use scheduler::{schedule, wait_for, TaskHandle};

/// Crate version from Cargo metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash embedded at build time, if the build ran inside a checkout
pub fn git_commit() -> Option<&'static str> {
    option_env!("STRATUM_GIT_COMMIT")
}

/// Human-readable version string
pub fn version() -> String {
    match git_commit() {
        Some(commit) => format!("{} ({})", VERSION, &commit[..commit.len().min(12)]),
        None => VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_nonempty() {
        assert!(!version().is_empty());
        assert!(version().starts_with(VERSION));
    }
}
