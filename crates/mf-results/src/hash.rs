//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};

/// Deterministic run id from the serialized system, inputs and options.
/// The caller supplies pre-serialized parts so this crate stays agnostic
/// of the topology schema.
pub fn compute_run_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let result = hasher.finalize();
    format!("{:x}", result)
}
