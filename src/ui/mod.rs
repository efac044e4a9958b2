//! Terminal feedback that never touches stdout
//!
//! ```rust,ignore
//! use cpan_index::ui::{TaskSpinner, UiContext};
//!
//! let spinner = TaskSpinner::start(&UiContext::detect(), "Refreshing index");
//! // ... refresh ...
//! spinner.finish();
//! ```

mod context;
mod progress;

pub use context::UiContext;
pub use progress::TaskSpinner;
