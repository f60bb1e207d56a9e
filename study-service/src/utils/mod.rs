pub mod text;
pub mod validation;

pub use text::normalize;
pub use validation::ValidatedJson;
