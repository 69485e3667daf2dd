use sgaudit_types::{Labels, ids};

/// Merge `overrides` on top of `base` into a new label set. Later values win on collision.
///
/// Neither input is modified, so one base set can be reused across policies without leaking
/// per-policy labels between them.
pub fn merge_labels(base: &Labels, overrides: &Labels) -> Labels {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Merge configured labels on top of `base`, skipping the reserved identity keys.
///
/// Identity keys in `base` are kept as they are; any other collision is won by `configured`.
pub fn merge_configured_labels(base: &Labels, configured: &Labels) -> Labels {
    let mut merged = base.clone();
    for (key, value) in configured {
        if !ids::IDENTITY_LABELS.contains(&key.as_str()) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
