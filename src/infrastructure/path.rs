use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};

/// Longest path an expansion may produce
const MAX_PATH_LEN: usize = libc::PATH_MAX as usize;
const MAX_USER_LEN: usize = 127;

/// Expand `~` and `~user` at the start of a path. Anything that cannot be
/// expanded is returned unchanged.
pub fn expand_tilde(path: &str) -> String {
    let Some(rest) = path.strip_prefix('~') else {
        return path.to_string();
    };

    // "~name" without a slash is taken as a file in the caller's home
    let (user, tail) = match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash + 1..]),
        None => ("", rest),
    };
    if user.len() > MAX_USER_LEN {
        return path.to_string();
    }

    let home = if user.is_empty() {
        dirs::home_dir()
    } else {
        home_dir_of(user)
    };
    let Some(home) = home else {
        return path.to_string();
    };

    let mut expanded = home.to_string_lossy().into_owned();
    if !expanded.ends_with('/') {
        expanded.push('/');
    }
    expanded.push_str(tail);

    if expanded.len() >= MAX_PATH_LEN {
        return path.to_string();
    }
    expanded
}

/// Home directory of a named user from the password database
fn home_dir_of(user: &str) -> Option<PathBuf> {
    let name = CString::new(user).ok()?;
    let mut pwd = std::mem::MaybeUninit::<libc::passwd>::uninit();
    let mut buf = vec![0 as libc::c_char; 4096];
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    let rc = unsafe {
        libc::getpwnam_r(
            name.as_ptr(),
            pwd.as_mut_ptr(),
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() {
        return None;
    }

    let dir = unsafe { CStr::from_ptr((*result).pw_dir) };
    Some(PathBuf::from(dir.to_string_lossy().into_owned()))
}

/// A bare line name such as `ttyUSB0` lives under `/dev`
pub fn resolve_device_path(line: &str) -> String {
    if line.contains('/') {
        line.to_string()
    } else {
        Path::new("/dev").join(line).to_string_lossy().into_owned()
    }
}
