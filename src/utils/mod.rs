// Tue Jan 13 2026 - Alex

pub mod math;
pub mod multiset;

pub use math::MathUtils;
pub use multiset::Multiset;
