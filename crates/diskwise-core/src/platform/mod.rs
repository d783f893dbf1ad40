/// Platform-specific functionality: drive / mount-point enumeration used to
/// pick a scan root.
pub mod drives;

pub use drives::{enumerate_drives, DriveInfo, DriveType};
