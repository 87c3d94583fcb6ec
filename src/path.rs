use crate::RunnixError;

/// Mount point under which WSL exposes Windows drives.
const MOUNT_ROOT: &str = "/mnt/";

/// Converts a drive-letter path (`C:\dir\file`) into its WSL mount form
/// (`/mnt/c/dir/file`).
///
/// Only the `<letter>:` prefix is rewritten; the rest of the path is kept as
/// is apart from backslashes becoming forward slashes. UNC paths are rejected.
pub fn to_subsystem_path(host_path: &str) -> Result<String, RunnixError> {
    let mut chars = host_path.chars();
    let (Some(drive), Some(':')) = (chars.next(), chars.next()) else {
        return Err(RunnixError::InvalidPath(host_path.to_owned()));
    };
    if !drive.is_ascii_alphabetic() {
        return Err(RunnixError::InvalidPath(host_path.to_owned()));
    }

    let mut unix_path = String::with_capacity(MOUNT_ROOT.len() + host_path.len());
    unix_path.push_str(MOUNT_ROOT);
    unix_path.push(drive.to_ascii_lowercase());
    // Both prefix characters are ASCII, so byte offset 2 is a char boundary.
    unix_path.push_str(&host_path[2..]);

    Ok(unix_path.replace('\\', "/"))
}
