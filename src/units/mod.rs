pub mod converter;
pub mod table;

pub use converter::{convert, normalize, round4};
pub use table::{CanonicalUnit, UnitDomain};
