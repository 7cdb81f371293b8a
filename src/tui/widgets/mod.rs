pub mod habits;
pub mod header;
pub mod heatmap;
pub mod statusbar;
pub mod streak;
pub mod trend;
