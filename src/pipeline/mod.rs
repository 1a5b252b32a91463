pub mod extraction;
pub mod normalize;
