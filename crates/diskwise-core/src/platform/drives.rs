/// Drive enumeration for choosing a scan root.
///
/// On Windows every local drive letter is listed with its volume label,
/// filesystem and capacity. Elsewhere the filesystem root is the only
/// candidate and capacity is not queried.
use serde::Serialize;
use std::path::PathBuf;

/// A candidate scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveInfo {
    /// Mount point path, e.g. `C:\` or `/`.
    pub path: PathBuf,
    /// Drive letter (`C:`), or the path itself where letters do not exist.
    pub letter: String,
    pub drive_type: DriveType,
    /// Volume label; empty when unknown.
    pub label: String,
    /// Filesystem name (`NTFS`, `FAT32`); empty when unknown.
    pub filesystem: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveType {
    Fixed,
    Removable,
    Network,
    CdRom,
    Unknown,
}

impl DriveType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::Removable => "Removable",
            Self::Network => "Network",
            Self::CdRom => "CD-ROM",
            Self::Unknown => "Unknown",
        }
    }
}

impl DriveInfo {
    /// Used space as a percentage of capacity (0.0 when capacity is unknown).
    pub fn usage_percent(&self) -> f32 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64 * 100.0) as f32
    }
}

/// Enumerate local drives. Network drives are excluded.
pub fn enumerate_drives() -> Vec<DriveInfo> {
    imp::enumerate_drives()
}

#[cfg(windows)]
mod imp {
    use super::{DriveInfo, DriveType};
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use std::path::PathBuf;
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::{
        GetDiskFreeSpaceExW, GetDriveTypeW, GetLogicalDriveStringsW, GetVolumeInformationW,
    };

    const DRIVE_REMOVABLE: u32 = 2;
    const DRIVE_FIXED: u32 = 3;
    const DRIVE_REMOTE: u32 = 4;
    const DRIVE_CDROM: u32 = 5;

    fn until_nul(buf: &[u16]) -> String {
        let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        String::from_utf16_lossy(&buf[..end])
    }

    pub(super) fn enumerate_drives() -> Vec<DriveInfo> {
        let mut buffer = [0u16; 256];
        let len = unsafe { GetLogicalDriveStringsW(Some(&mut buffer)) } as usize;
        if len == 0 || len > buffer.len() {
            tracing::warn!("GetLogicalDriveStringsW returned {len}");
            return Vec::new();
        }

        // Null-separated list of roots such as "C:\\\0D:\\\0".
        let roots = OsString::from_wide(&buffer[..len]);
        roots
            .to_string_lossy()
            .split('\0')
            .filter(|s| !s.is_empty())
            .filter_map(query_drive)
            .collect()
    }

    fn query_drive(root: &str) -> Option<DriveInfo> {
        let wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
        let root_ptr = PCWSTR(wide.as_ptr());

        let drive_type = match unsafe { GetDriveTypeW(root_ptr) } {
            DRIVE_FIXED => DriveType::Fixed,
            DRIVE_REMOVABLE => DriveType::Removable,
            DRIVE_REMOTE => DriveType::Network,
            DRIVE_CDROM => DriveType::CdRom,
            _ => DriveType::Unknown,
        };
        if drive_type == DriveType::Network {
            return None;
        }

        let mut label_buf = [0u16; 256];
        let mut fs_buf = [0u16; 256];
        let (label, filesystem) = match unsafe {
            GetVolumeInformationW(
                root_ptr,
                Some(&mut label_buf),
                None,
                None,
                None,
                Some(&mut fs_buf),
            )
        } {
            Ok(()) => (until_nul(&label_buf), until_nul(&fs_buf)),
            Err(err) => {
                tracing::debug!("No volume information for {root}: {err}");
                (String::new(), String::new())
            }
        };

        let mut free_caller: u64 = 0;
        let mut total: u64 = 0;
        let mut free_total: u64 = 0;
        let has_space = unsafe {
            GetDiskFreeSpaceExW(
                root_ptr,
                Some(&mut free_caller as *mut u64),
                Some(&mut total as *mut u64),
                Some(&mut free_total as *mut u64),
            )
            .is_ok()
        };
        let (total_bytes, free_bytes) = if has_space {
            (total, free_caller)
        } else {
            (0, 0)
        };

        Some(DriveInfo {
            path: PathBuf::from(root),
            letter: root.trim_end_matches('\\').to_string(),
            drive_type,
            label,
            filesystem,
            total_bytes,
            free_bytes,
            used_bytes: total_bytes.saturating_sub(free_bytes),
        })
    }
}

#[cfg(not(windows))]
mod imp {
    use super::{DriveInfo, DriveType};
    use std::path::PathBuf;

    pub(super) fn enumerate_drives() -> Vec<DriveInfo> {
        vec![DriveInfo {
            path: PathBuf::from("/"),
            letter: "/".to_string(),
            drive_type: DriveType::Fixed,
            label: String::new(),
            filesystem: String::new(),
            total_bytes: 0,
            free_bytes: 0,
            used_bytes: 0,
        }]
    }
}
