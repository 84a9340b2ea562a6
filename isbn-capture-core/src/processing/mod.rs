pub mod binarize;
pub mod patterns;
