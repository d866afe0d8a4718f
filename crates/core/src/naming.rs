//! Filename conventions for uploaded and generated files.
//!
//! Uploads arrive with client-controlled names; everything is sanitized
//! before it touches a storage directory, and worker artifacts are keyed
//! by job id so two jobs can upload the same original filename.

/// Sanitize a client-supplied filename so it is safe to join onto a
/// storage directory.
///
/// Path components are dropped, anything outside `[A-Za-z0-9._-]` becomes
/// `_`, and leading/trailing dots and underscores are stripped. Returns
/// `"unnamed"` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use stagekit_core::naming::sanitize_filename;
///
/// assert_eq!(sanitize_filename("scene.glb"), "scene.glb");
/// assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
/// assert_eq!(sanitize_filename("my scene (1).glb"), "my_scene__1_.glb");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Storage filename for a worker-uploaded artifact:
/// `{job_id}__{sanitized original}`.
pub fn artifact_filename(job_id: &str, original: &str) -> String {
    format!("{job_id}__{}", sanitize_filename(original))
}
