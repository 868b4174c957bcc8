//! The test battery.
//!
//! | suite            | tags         | needs browser |
//! |------------------|--------------|---------------|
//! | `repository_api` | `api`        | no            |
//! | `repository_ui`  | `ui`         | yes           |
//! | `search`         | `ui`,`bonus` | yes           |

pub mod repository_api;
pub mod repository_ui;
pub mod search;

use crate::harness::TestCase;

/// Every registered case, in run order
#[must_use]
pub fn all() -> Vec<TestCase> {
    let mut cases = repository_api::cases();
    cases.extend(repository_ui::cases());
    cases.extend(search::cases());
    cases
}
