//! View-models shared by the terminal and web front ends: formatting,
//! tabs, dropdowns, chart slots and progress.

pub mod chart;
pub mod dropdown;
pub mod format;
pub mod progress;
pub mod tabs;

pub use chart::{ChartKind, ChartSlot, ChartSpec, Dataset, Datum, NO_DATA, SlotContent};
pub use dropdown::{BrandRamIndex, Dropdown, FilterDropdowns};
pub use progress::Progress;
pub use tabs::{Tab, TabGroup};
