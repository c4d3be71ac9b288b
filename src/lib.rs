pub mod anchor;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod store;
pub mod text;
#[cfg(feature = "font-metrics")]
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use error::{ConnectError, MindMapError, StoreError, UnknownLayout};
pub use layout::{LayoutEngine, LayoutKind, LayoutStrategy};
pub use model::{LineStyle, MindMap, Node, NodeId, NodeShape};
