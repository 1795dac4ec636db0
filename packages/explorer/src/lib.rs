#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! What the map needs from the statistics core.
//!
//! Given a snapshot and the user's map settings, decides how the map is
//! drawn (bubbles, fills or spikes), computes the value of every region,
//! sizes bubbles against the largest value, and builds the side panel for
//! the highlighted region.

pub mod dashboard;
pub mod explorer;
pub mod panel;
pub mod scale;
pub mod settings;
pub mod states;

pub use dashboard::Dashboard;
pub use explorer::{Bubble, DistrictGeometry, MapExplorer, MapRegion};
pub use panel::{RegionHighlight, RegionPanel, last_updated_line};
pub use scale::BubbleScale;
pub use settings::{MapKind, MapSettings, MapView, MapViz};
