pub mod artwork;
pub mod models;
pub mod store;
pub mod traits;

pub use models::*;
pub use store::*;
pub use traits::*;
