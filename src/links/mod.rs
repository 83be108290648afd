pub mod detector;
pub mod normalize;

pub use detector::first_link;
pub use normalize::normalize_link;
