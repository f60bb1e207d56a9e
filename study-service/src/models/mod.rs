pub mod capability;
pub mod upload;

pub use capability::{Capability, ModelTier};
pub use upload::UploadedFile;
