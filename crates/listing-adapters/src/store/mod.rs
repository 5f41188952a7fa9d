//! Implementaciones de `ObjectStore`.

mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;

use listing_core::adapter::StoreError;

/// Reglas comunes de keys: no vacías, relativas y sin segmentos `..`.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
              || key.starts_with('/')
              || key.ends_with('/')
              || key.contains('\\')
              || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_key;

    #[test]
    fn rejects_escaping_or_empty_keys() {
        for bad in ["", "/abs", "a/../b", "dir/", "a//b", "win\\path"] {
            assert!(validate_key(bad).is_err(), "{bad:?} should be invalid");
        }
        assert!(validate_key("staging/response_data_2025-03-01-00-00-00.csv").is_ok());
    }
}
