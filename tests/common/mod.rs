mod test_utils;

#[allow(unused_imports)]
pub use test_utils::*;
