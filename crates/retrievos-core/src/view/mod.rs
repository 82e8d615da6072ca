// ── Derived views over a batch ──

pub mod filter;
pub mod sort;
pub mod view_model;

pub use filter::{FilterState, matches};
pub use sort::{Direction, SortState, compare};
pub use view_model::{Summary, UpgradeSplit, ViewModel};
