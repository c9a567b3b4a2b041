//! Recipient lists and the user's selection.

use crate::session_manager::SessionManager;
use herald_core::recipient::{Recipient, RecipientKind, SelectionSet};
use herald_core::session::IdentityProvider;
use herald_core::{PreconditionError, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct CatalogState {
    individuals: Vec<Recipient>,
    groups: Vec<Recipient>,
    selection: SelectionSet,
}

impl CatalogState {
    fn list(&self, kind: RecipientKind) -> &[Recipient] {
        match kind {
            RecipientKind::Individual => &self.individuals,
            RecipientKind::Group => &self.groups,
        }
    }
}

/// Outcome of one [`RecipientCatalog::fetch`], per category.
///
/// `Ok` carries the number of recipients now listed. On `Err` the previous
/// list for that category was kept.
#[derive(Debug)]
pub struct FetchSummary {
    pub individuals: Result<usize>,
    pub groups: Result<usize>,
}

impl FetchSummary {
    pub fn is_complete(&self) -> bool {
        self.individuals.is_ok() && self.groups.is_ok()
    }
}

/// Caches the two recipient lists and owns the selection.
#[derive(Clone)]
pub struct RecipientCatalog {
    identity: Arc<dyn IdentityProvider>,
    session: SessionManager,
    state: Arc<RwLock<CatalogState>>,
}

impl RecipientCatalog {
    pub fn new(identity: Arc<dyn IdentityProvider>, session: SessionManager) -> Self {
        Self {
            identity,
            session,
            state: Arc::new(RwLock::new(CatalogState::default())),
        }
    }

    /// Queries both lists concurrently.
    ///
    /// Each list is replaced as soon as its own response arrives, so one
    /// failing query never holds back the other.
    ///
    /// # Errors
    ///
    /// `NotConnected` when there is no session. Query failures are reported
    /// in the returned [`FetchSummary`], not as an `Err`.
    pub async fn fetch(&self) -> Result<FetchSummary> {
        let token = self
            .session
            .token()
            .await
            .ok_or(PreconditionError::NotConnected)?;

        let individuals = async {
            let result = self.identity.list_individuals(&token).await;
            self.apply(RecipientKind::Individual, result)
        };
        let groups = async {
            let result = self.identity.list_groups(&token).await;
            self.apply(RecipientKind::Group, result)
        };
        let (individuals, groups) = tokio::join!(individuals, groups);

        Ok(FetchSummary {
            individuals,
            groups,
        })
    }

    fn apply(&self, kind: RecipientKind, result: Result<Vec<Recipient>>) -> Result<usize> {
        match result {
            Ok(list) => {
                let count = list.len();
                let mut state = self.write();
                match kind {
                    RecipientKind::Individual => state.individuals = list,
                    RecipientKind::Group => state.groups = list,
                }
                tracing::debug!("[RecipientCatalog] Loaded {} {} recipient(s)", count, kind);
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("[RecipientCatalog] Failed to load {} list: {}", kind, e);
                Err(e)
            }
        }
    }

    pub fn recipients(&self, kind: RecipientKind) -> Vec<Recipient> {
        self.read().list(kind).to_vec()
    }

    pub fn individuals(&self) -> Vec<Recipient> {
        self.recipients(RecipientKind::Individual)
    }

    pub fn groups(&self) -> Vec<Recipient> {
        self.recipients(RecipientKind::Group)
    }

    pub fn toggle_selection(&self, id: &str) {
        self.write().selection.toggle(id);
    }

    /// Selects every recipient of `kind`, or deselects them all if they
    /// already were. No-op on an empty category.
    pub fn select_all(&self, kind: RecipientKind) {
        let mut state = self.write();
        let CatalogState {
            individuals,
            groups,
            selection,
        } = &mut *state;
        let list = match kind {
            RecipientKind::Individual => individuals,
            RecipientKind::Group => groups,
        };
        selection.toggle_all(list.iter().map(|r| r.id.as_str()));
    }

    /// Deselects every recipient of `kind`.
    pub fn select_none(&self, kind: RecipientKind) {
        let mut state = self.write();
        let CatalogState {
            individuals,
            groups,
            selection,
        } = &mut *state;
        let list = match kind {
            RecipientKind::Individual => individuals,
            RecipientKind::Group => groups,
        };
        selection.remove_all(list.iter().map(|r| r.id.as_str()));
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.read().selection.contains(id)
    }

    pub fn selection(&self) -> SelectionSet {
        self.read().selection.clone()
    }

    /// Resolves the selection against the cached lists, individuals first.
    ///
    /// Ids that match no cached recipient are skipped.
    pub fn selected_recipients(&self) -> Vec<Recipient> {
        let state = self.read();
        state
            .individuals
            .iter()
            .chain(state.groups.iter())
            .filter(|r| state.selection.contains(&r.id))
            .cloned()
            .collect()
    }

    /// Drops both lists and the selection.
    pub fn clear(&self) {
        *self.write() = CatalogState::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::HeraldError;
    use herald_core::config::IdentityConfig;
    use herald_core::session::{AccessToken, LoginOutcome, LoginStatus, Profile, TOKEN_KEY};
    use herald_infrastructure::InMemorySessionStore;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // Mock IdentityProvider serving canned lists
    struct ListingIdentity {
        individuals: Mutex<Result<Vec<Recipient>>>,
        groups: Mutex<Result<Vec<Recipient>>>,
    }

    impl ListingIdentity {
        fn new(individuals: Result<Vec<Recipient>>, groups: Result<Vec<Recipient>>) -> Self {
            Self {
                individuals: Mutex::new(individuals),
                groups: Mutex::new(groups),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for ListingIdentity {
        async fn init(&self, _app_id: &str, _config: &IdentityConfig) -> Result<()> {
            Ok(())
        }

        async fn get_status(&self, _known: Option<&AccessToken>) -> Result<LoginStatus> {
            Err(HeraldError::network("unused"))
        }

        async fn login(&self, _scopes: &[String]) -> Result<LoginOutcome> {
            Ok(LoginOutcome::Denied)
        }

        async fn logout(&self, _token: &AccessToken) -> Result<()> {
            Ok(())
        }

        async fn fetch_profile(&self, _token: &AccessToken) -> Result<Profile> {
            Ok(Profile::new("1", "Ada"))
        }

        async fn list_individuals(&self, _token: &AccessToken) -> Result<Vec<Recipient>> {
            self.individuals.lock().unwrap().clone()
        }

        async fn list_groups(&self, _token: &AccessToken) -> Result<Vec<Recipient>> {
            self.groups.lock().unwrap().clone()
        }
    }

    fn friends() -> Vec<Recipient> {
        vec![Recipient::individual("a", "Ann"), Recipient::individual("b", "Bo")]
    }

    fn groups() -> Vec<Recipient> {
        vec![Recipient::group("g", "Garden club").with_member_count(8)]
    }

    async fn connected_catalog(identity: ListingIdentity) -> (RecipientCatalog, Arc<ListingIdentity>) {
        let identity = Arc::new(identity);
        let store = InMemorySessionStore::with_entries([(TOKEN_KEY, "tok-1")]);
        let session = SessionManager::new(identity.clone(), Arc::new(store), IdentityConfig::default());
        session.restore().await.unwrap();
        (RecipientCatalog::new(identity.clone(), session), identity)
    }

    #[tokio::test]
    async fn test_fetch_requires_session() {
        let identity = Arc::new(ListingIdentity::new(Ok(friends()), Ok(groups())));
        let session = SessionManager::new(
            identity.clone(),
            Arc::new(InMemorySessionStore::new()),
            IdentityConfig::default(),
        );
        let catalog = RecipientCatalog::new(identity, session);

        let err = catalog.fetch().await.unwrap_err();
        assert_eq!(err.precondition(), Some(&PreconditionError::NotConnected));
    }

    #[tokio::test]
    async fn test_fetch_loads_both_lists() {
        let (catalog, _) = connected_catalog(ListingIdentity::new(Ok(friends()), Ok(groups()))).await;

        let summary = catalog.fetch().await.unwrap();

        assert!(summary.is_complete());
        assert_eq!(catalog.individuals().len(), 2);
        assert_eq!(catalog.groups()[0].member_count, Some(8));
    }

    #[tokio::test]
    async fn test_failed_category_keeps_previous_list() {
        let (catalog, identity) =
            connected_catalog(ListingIdentity::new(Ok(friends()), Ok(groups()))).await;
        catalog.fetch().await.unwrap();

        *identity.groups.lock().unwrap() = Err(HeraldError::network("timeout"));
        *identity.individuals.lock().unwrap() = Ok(vec![Recipient::individual("c", "Cy")]);
        let summary = catalog.fetch().await.unwrap();

        assert_eq!(summary.individuals.as_ref().ok(), Some(&1));
        assert!(summary.groups.is_err());
        assert_eq!(catalog.individuals()[0].id, "c");
        assert_eq!(catalog.groups().len(), 1);
    }

    #[tokio::test]
    async fn test_select_all_toggles_category() {
        let (catalog, _) = connected_catalog(ListingIdentity::new(Ok(friends()), Ok(groups()))).await;
        catalog.fetch().await.unwrap();

        catalog.toggle_selection("a");
        catalog.select_all(RecipientKind::Individual);
        assert!(catalog.is_selected("a") && catalog.is_selected("b"));

        catalog.select_all(RecipientKind::Individual);
        assert!(catalog.selection().is_empty());
    }

    #[tokio::test]
    async fn test_select_all_on_empty_category_is_noop() {
        let (catalog, _) = connected_catalog(ListingIdentity::new(Ok(friends()), Ok(Vec::new()))).await;
        catalog.fetch().await.unwrap();
        catalog.toggle_selection("a");

        catalog.select_all(RecipientKind::Group);

        assert_eq!(catalog.selection().len(), 1);
    }

    #[tokio::test]
    async fn test_selected_recipients_lists_individuals_first() {
        let (catalog, _) = connected_catalog(ListingIdentity::new(Ok(friends()), Ok(groups()))).await;
        catalog.fetch().await.unwrap();

        catalog.toggle_selection("g");
        catalog.toggle_selection("b");
        catalog.toggle_selection("unknown");

        let ids: Vec<String> = catalog
            .selected_recipients()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "g"]);
    }

    #[tokio::test]
    async fn test_select_none_and_clear() {
        let (catalog, _) = connected_catalog(ListingIdentity::new(Ok(friends()), Ok(groups()))).await;
        catalog.fetch().await.unwrap();
        catalog.select_all(RecipientKind::Individual);
        catalog.select_all(RecipientKind::Group);

        catalog.select_none(RecipientKind::Individual);
        assert_eq!(catalog.selected_recipients().len(), 1);

        catalog.clear();
        assert!(catalog.individuals().is_empty());
        assert!(catalog.selection().is_empty());
    }

    // The first individuals query answers slowly, later ones quickly
    struct SlowFirstIdentity {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for SlowFirstIdentity {
        async fn init(&self, _app_id: &str, _config: &IdentityConfig) -> Result<()> {
            Ok(())
        }

        async fn get_status(&self, _known: Option<&AccessToken>) -> Result<LoginStatus> {
            Err(HeraldError::network("unused"))
        }

        async fn login(&self, _scopes: &[String]) -> Result<LoginOutcome> {
            Ok(LoginOutcome::Denied)
        }

        async fn logout(&self, _token: &AccessToken) -> Result<()> {
            Ok(())
        }

        async fn fetch_profile(&self, _token: &AccessToken) -> Result<Profile> {
            Ok(Profile::new("1", "Ada"))
        }

        async fn list_individuals(&self, _token: &AccessToken) -> Result<Vec<Recipient>> {
            let (delay, id) = match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => (1000, "slow"),
                _ => (10, "fast"),
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(vec![Recipient::individual(id, id)])
        }

        async fn list_groups(&self, _token: &AccessToken) -> Result<Vec<Recipient>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_fetches_keep_last_completed_response() {
        let identity = Arc::new(SlowFirstIdentity {
            calls: AtomicUsize::new(0),
        });
        let store = InMemorySessionStore::with_entries([(TOKEN_KEY, "tok-1")]);
        let session = SessionManager::new(identity.clone(), Arc::new(store), IdentityConfig::default());
        session.restore().await.unwrap();
        let catalog = RecipientCatalog::new(identity.clone(), session);

        let first = tokio::spawn({
            let catalog = catalog.clone();
            async move { catalog.fetch().await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);

        catalog.fetch().await.unwrap();
        assert_eq!(catalog.individuals()[0].id, "fast");

        let summary = first.await.unwrap().unwrap();
        assert!(summary.is_complete());
        assert_eq!(catalog.individuals().len(), 1);
        assert_eq!(catalog.individuals()[0].id, "slow");
    }
}
