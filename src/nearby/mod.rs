pub mod item;
pub mod refresh;
pub mod source;

pub use item::NearbyItem;
pub use refresh::RefreshSequencer;
pub use source::RandomNearbySource;
