//! Returning freed heap pages to the operating system

/// Ask the allocator to hand unused pages back to the OS.
///
/// On glibc this trims the malloc arenas; elsewhere it does nothing. It is a
/// hint only and never fails.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub fn release_to_os() {
    // SAFETY: malloc_trim only walks allocator-internal state.
    let trimmed = unsafe { libc::malloc_trim(0) };
    tracing::trace!(trimmed = trimmed != 0, "malloc_trim");
}

/// Ask the allocator to hand unused pages back to the OS.
///
/// No allocator hook is available on this target, so this is a no-op.
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
pub fn release_to_os() {}
