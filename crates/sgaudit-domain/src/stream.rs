use sgaudit_types::{Labels, PolicyPath, StreamId, ids};
use sha2::{Digest, Sha256};
use uuid::Builder;

/// Compute the stream identifier for one (resource, policy) pair.
///
/// Identity fields:
/// - resource type
/// - policy path
/// - resource id
///
/// The same inputs always yield the same id, across runs and processes, so a sink can
/// upsert successive results for one logical check into one stream.
pub fn stream_id(resource_type: &str, policy_path: &PolicyPath, resource_id: &str) -> StreamId {
    let mut seed = Labels::new();
    seed.insert(ids::LABEL_TYPE.to_string(), resource_type.to_string());
    seed.insert(
        ids::LABEL_POLICY_PATH.to_string(),
        policy_path.as_str().to_string(),
    );
    seed.insert(ids::LABEL_GROUP_ID.to_string(), resource_id.to_string());
    seed_stream_id(&seed)
}

/// Seed a stream id from an arbitrary label set.
///
/// Each key and value is length-prefixed before hashing so that no two distinct label sets
/// share a canonical form.
pub fn seed_stream_id(labels: &Labels) -> StreamId {
    let mut canonical = String::new();
    for (key, value) in labels {
        canonical.push_str(&format!("{}:{}={}:{};", key.len(), key, value.len(), value));
    }

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    StreamId::from_uuid(Builder::from_custom_bytes(bytes).into_uuid())
}
