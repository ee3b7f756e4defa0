use crate::errors::GateError;
use crate::store::PreferenceStore;

const BZIP2_SUFFIX: &str = ".bz2";

/// Strip a trailing `.bz2` so the compressed and uncompressed variants of a
/// file share one policy identity. Only the final suffix is stripped.
pub fn normalize_path(filepath: &str) -> &str {
    filepath.strip_suffix(BZIP2_SUFFIX).unwrap_or(filepath)
}

/// Three-tier resolution, in strict priority order: explicit account
/// preference, then category default, then allow.
///
/// The category lookup short-circuits before any account-scoped lookup, so
/// unregistered files resolve allow for every account. A registered file
/// whose category row is missing also resolves allow; missing data is never
/// grounds for a deny.
pub async fn resolve(
    store: &dyn PreferenceStore,
    sid3: i64,
    filepath: &str,
) -> Result<bool, GateError> {
    let filepath = normalize_path(filepath);

    let Some(category) = store.category_for_file(filepath).await? else {
        return Ok(true);
    };

    if let Some(enabled) = store.explicit_preference(sid3, category).await? {
        return Ok(enabled);
    }

    if let Some(enabled) = store.category_default(category).await? {
        return Ok(enabled);
    }

    Ok(true)
}
