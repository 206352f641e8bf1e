pub mod annotator;
pub mod describe;
pub mod filter;
pub mod registry;
pub mod traits;
pub mod types;

pub use registry::StrategyRegistry;
pub use traits::{DescriptionStrategy, DescriptionStrategyKind};
pub use types::{BoundingBox, FrameBoundary, IndexedElement, Orientation, ScreenSize, UIElement};
