use sha2::{Digest, Sha512};
use std::path::Path;

/// Local import alias for a specialisation: `cls_` + hex SHA-512 of the
/// length-prefixed `(source_file, export_name)` pair.
///
/// The length prefixes keep the encoding injective, so `("a.js", "xB")` and
/// `("a.jsx", "B")` never feed the hasher the same bytes.
pub fn unique_identifier(source_file: &Path, export_name: &str) -> String {
    let file = source_file.to_string_lossy();
    let mut hasher = Sha512::new();
    for part in [file.as_bytes(), export_name.as_bytes()] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    format!("cls_{:x}", hasher.finalize())
}
