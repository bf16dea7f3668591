//! Windows frontmost application detection
//!
//! Resolves the foreground window to its owning process and returns the
//! executable filename. The extension is kept; the matching rule strips it
//! when comparing against window-title targets.

use super::{matching, FrontmostProbe};

/// Probe backed by the Win32 foreground window
pub struct WindowsProbe;

impl FrontmostProbe for WindowsProbe {
    fn frontmost_app_id(&self) -> Option<String> {
        foreground_executable_name()
    }

    fn ids_match(&self, frontmost: &str, target: &str) -> bool {
        matching::windows_ids_match(frontmost, target)
    }
}

fn foreground_executable_name() -> Option<String> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;

    #[link(name = "user32")]
    extern "system" {
        fn GetForegroundWindow() -> *mut std::ffi::c_void;
        fn GetWindowThreadProcessId(hwnd: *mut std::ffi::c_void, process_id: *mut u32) -> u32;
    }

    #[link(name = "kernel32")]
    extern "system" {
        fn OpenProcess(access: u32, inherit: i32, pid: u32) -> *mut std::ffi::c_void;
        fn CloseHandle(handle: *mut std::ffi::c_void) -> i32;
        fn QueryFullProcessImageNameW(
            process: *mut std::ffi::c_void,
            flags: u32,
            name: *mut u16,
            size: *mut u32,
        ) -> i32;
    }

    const PROCESS_QUERY_LIMITED_INFORMATION: u32 = 0x1000;

    unsafe {
        let hwnd = GetForegroundWindow();
        if hwnd.is_null() {
            return None;
        }

        let mut pid: u32 = 0;
        GetWindowThreadProcessId(hwnd, &mut pid);
        if pid == 0 {
            return None;
        }

        let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if process.is_null() {
            return None;
        }

        let mut buffer = [0u16; 1024];
        let mut size = buffer.len() as u32;

        let result = QueryFullProcessImageNameW(process, 0, buffer.as_mut_ptr(), &mut size);
        CloseHandle(process);

        if result == 0 {
            return None;
        }

        let path = OsString::from_wide(&buffer[..size as usize]);
        let path_str = path.to_string_lossy();

        // Keep the extension: the frontmost id is "Code.exe", not "Code".
        std::path::Path::new(path_str.as_ref())
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_executable_name() {
        // Only meaningful when run in an interactive session.
        if let Some(name) = foreground_executable_name() {
            println!("Foreground executable: {}", name);
            assert!(!name.is_empty());
        }
    }
}
