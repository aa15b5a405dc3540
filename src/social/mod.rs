pub mod collector;
pub mod records;
pub mod service;
pub mod session;
pub mod store;

pub use collector::PostcardCollector;
pub use records::{decode_postcards, AppUser, Postcard};
pub use service::{ProfileSummary, UserService};
pub use session::StaticSession;
pub use store::MemoryStore;
