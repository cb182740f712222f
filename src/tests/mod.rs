
pub use base::*;
