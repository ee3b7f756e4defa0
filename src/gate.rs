use crate::errors::GateError;
use crate::resolver;
use crate::store::PreferenceStore;

/// Outcome of a download-authorization check. Every malformed or denied
/// request maps to a deny variant; only a backend failure is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// The file's category is opt-in and the account has not opted in.
    OptInRequired,
    /// No usable account identifier in the request.
    NoAccount,
    NoFile,
    SecretMismatch,
}

/// Query parameters of a download request, all optional at the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub file: Option<String>,
    pub steamid: Option<String>,
    pub secret: Option<String>,
}

/// Ordered checks, each terminal on failure: shared secret, then file, then
/// account, then preference resolution. The secret gate runs first so a
/// request that bypassed the rewrite rule learns nothing about the rest.
pub async fn decide(
    store: &dyn PreferenceStore,
    configured_secret: Option<&str>,
    req: &DownloadRequest,
) -> Result<Decision, GateError> {
    if let Some(expected) = configured_secret {
        if req.secret.as_deref() != Some(expected) {
            return Ok(Decision::SecretMismatch);
        }
    }

    let Some(file) = req.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Decision::NoFile);
    };

    // A non-numeric steamid is treated the same as an absent one
    let Some(sid3) = req.steamid.as_deref().and_then(|s| s.parse::<i64>().ok()) else {
        return Ok(Decision::NoAccount);
    };

    if resolver::resolve(store, sid3, file).await? {
        Ok(Decision::Allow)
    } else {
        Ok(Decision::OptInRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::MemStore;

    fn request(file: &str, steamid: &str) -> DownloadRequest {
        DownloadRequest {
            file: Some(file.to_string()),
            steamid: Some(steamid.to_string()),
            secret: None,
        }
    }

    fn opt_in_store() -> MemStore {
        let mut store = MemStore::default();
        store.files.insert("maps/b.bsp".to_string(), 1);
        store.categories.insert(1, false);
        store
    }

    #[tokio::test]
    async fn test_unregistered_file_allowed() {
        let store = MemStore::default();
        let decision = decide(&store, None, &request("sound/a.mp3", "123"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[tokio::test]
    async fn test_opt_in_category_denied_without_preference() {
        let store = opt_in_store();
        let decision = decide(&store, None, &request("maps/b.bsp", "123"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::OptInRequired);
    }

    #[tokio::test]
    async fn test_opt_in_category_allowed_with_explicit_preference() {
        let mut store = opt_in_store();
        store.prefs.insert((123, 1), true);
        let decision = decide(&store, None, &request("maps/b.bsp", "123"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[tokio::test]
    async fn test_missing_account_denied() {
        let store = MemStore::default();
        let req = DownloadRequest {
            file: Some("sound/a.mp3".to_string()),
            steamid: None,
            secret: None,
        };
        let decision = decide(&store, None, &req).await.unwrap();
        assert_eq!(decision, Decision::NoAccount);
    }

    #[tokio::test]
    async fn test_non_numeric_account_denied() {
        let store = MemStore::default();
        let decision = decide(&store, None, &request("sound/a.mp3", "not-a-steamid"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::NoAccount);
    }

    #[tokio::test]
    async fn test_missing_file_denied() {
        let store = MemStore::default();
        let req = DownloadRequest {
            file: None,
            steamid: Some("123".to_string()),
            secret: None,
        };
        assert_eq!(decide(&store, None, &req).await.unwrap(), Decision::NoFile);

        // An empty file parameter counts as missing
        let req = DownloadRequest {
            file: Some(String::new()),
            steamid: Some("123".to_string()),
            secret: None,
        };
        assert_eq!(decide(&store, None, &req).await.unwrap(), Decision::NoFile);
    }

    #[tokio::test]
    async fn test_secret_mismatch_checked_before_everything_else() {
        let store = MemStore::default();

        // Wrong secret: denied even though file and steamid are also missing
        let req = DownloadRequest {
            file: None,
            steamid: None,
            secret: Some("xyz".to_string()),
        };
        let decision = decide(&store, Some("abc"), &req).await.unwrap();
        assert_eq!(decision, Decision::SecretMismatch);

        // Missing secret counts as a mismatch
        let decision = decide(&store, Some("abc"), &request("sound/a.mp3", "123"))
            .await
            .unwrap();
        assert_eq!(decision, Decision::SecretMismatch);
    }

    #[tokio::test]
    async fn test_matching_secret_passes_through() {
        let store = MemStore::default();
        let mut req = request("sound/a.mp3", "123");
        req.secret = Some("abc".to_string());
        let decision = decide(&store, Some("abc"), &req).await.unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[tokio::test]
    async fn test_no_secret_configured_ignores_request_secret() {
        let store = MemStore::default();
        let mut req = request("sound/a.mp3", "123");
        req.secret = Some("whatever".to_string());
        let decision = decide(&store, None, &req).await.unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_error() {
        let mut store = opt_in_store();
        store.offline = true;
        assert!(decide(&store, None, &request("maps/b.bsp", "123"))
            .await
            .is_err());
    }
}
