mod category;
mod descriptor;
mod image;

pub use self::category::Category;
pub use self::descriptor::{ImageDescriptor, Variant};
pub use self::image::ImageRecord;
