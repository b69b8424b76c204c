mod fetcher_impls;
mod fetcher_traits;

pub use fetcher_traits::*;
