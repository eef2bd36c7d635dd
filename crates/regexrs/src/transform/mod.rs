// Transform layer
// Replace and split, built only on `Matches` and `Match`.

mod replace;
mod split;
pub mod template;

pub(crate) use replace::replace_n;
pub(crate) use split::split_n;
pub use template::{Replacement, Template};
