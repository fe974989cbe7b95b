//! Platform-specific launch details

/// Name of the JVM binary to invoke.
///
/// The Windows family gets the windowed variant unless a console is
/// explicitly requested; every other OS has only the console variant.
pub fn runtime_binary_name(console: bool) -> &'static str {
    #[cfg(windows)]
    {
        if console {
            "java.exe"
        } else {
            "javaw.exe"
        }
    }
    #[cfg(not(windows))]
    {
        let _ = console;
        "java"
    }
}

/// Whether the launcher itself runs as a 32-bit process.
pub fn is_32bit_host() -> bool {
    cfg!(target_pointer_width = "32")
}
