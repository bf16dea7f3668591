//! macOS frontmost application detection
//!
//! Queries NSWorkspace for the frontmost application and returns its bundle
//! identifier, falling back to the localized name for processes without one.

use std::ffi::CStr;

use super::{matching, FrontmostProbe};

/// Probe backed by the shared NSWorkspace
pub struct MacosProbe;

impl FrontmostProbe for MacosProbe {
    fn frontmost_app_id(&self) -> Option<String> {
        frontmost_app_identifier()
    }

    fn ids_match(&self, frontmost: &str, target: &str) -> bool {
        matching::macos_ids_match(frontmost, target)
    }
}

fn frontmost_app_identifier() -> Option<String> {
    use std::ffi::c_void;
    use std::os::raw::c_char;

    // Objective-C runtime types
    type Id = *mut c_void;
    type Sel = *mut c_void;
    type Class = *mut c_void;

    #[link(name = "objc", kind = "dylib")]
    extern "C" {
        fn objc_getClass(name: *const c_char) -> Class;
        fn sel_registerName(name: *const c_char) -> Sel;
        fn objc_msgSend(receiver: Id, selector: Sel, ...) -> Id;
    }

    #[link(name = "AppKit", kind = "framework")]
    extern "C" {}

    unsafe {
        // Get NSWorkspace class
        let ns_workspace_class = objc_getClass(b"NSWorkspace\0".as_ptr() as *const c_char);
        if ns_workspace_class.is_null() {
            return None;
        }

        // [NSWorkspace sharedWorkspace]
        let shared_workspace_sel = sel_registerName(b"sharedWorkspace\0".as_ptr() as *const c_char);
        let workspace: Id = objc_msgSend(ns_workspace_class, shared_workspace_sel);
        if workspace.is_null() {
            return None;
        }

        // [workspace frontmostApplication]
        let frontmost_app_sel =
            sel_registerName(b"frontmostApplication\0".as_ptr() as *const c_char);
        let app: Id = objc_msgSend(workspace, frontmost_app_sel);
        if app.is_null() {
            return None;
        }

        // [app bundleIdentifier], falling back to [app localizedName] for
        // processes that are not part of a bundle.
        let bundle_id_sel = sel_registerName(b"bundleIdentifier\0".as_ptr() as *const c_char);
        let bundle_id_nsstring: Id = objc_msgSend(app, bundle_id_sel);
        if let Some(bundle_id) = nsstring_to_string(bundle_id_nsstring) {
            return Some(bundle_id);
        }

        let localized_name_sel = sel_registerName(b"localizedName\0".as_ptr() as *const c_char);
        let name_nsstring: Id = objc_msgSend(app, localized_name_sel);
        nsstring_to_string(name_nsstring)
    }
}

unsafe fn nsstring_to_string(nsstring: *mut std::ffi::c_void) -> Option<String> {
    use std::ffi::c_void;
    use std::os::raw::c_char;

    type Id = *mut c_void;
    type Sel = *mut c_void;

    extern "C" {
        fn sel_registerName(name: *const c_char) -> Sel;
        fn objc_msgSend(receiver: Id, selector: Sel, ...) -> Id;
    }

    if nsstring.is_null() {
        return None;
    }

    // [nsstring UTF8String]
    let utf8_sel = sel_registerName(b"UTF8String\0".as_ptr() as *const c_char);
    let utf8_ptr: *const c_char = objc_msgSend(nsstring, utf8_sel) as *const c_char;

    if utf8_ptr.is_null() {
        return None;
    }

    CStr::from_ptr(utf8_ptr)
        .to_str()
        .ok()
        .map(|s| s.to_string())
}
