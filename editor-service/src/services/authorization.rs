use crate::error::EditorError;
use crate::models::{DocumentKind, User};
use async_trait::async_trait;
use std::sync::Arc;

/// External predicate answering whether a user may access one document of a
/// fixed kind.
#[async_trait]
pub trait CapabilityOracle: Send + Sync {
    async fn can_access(&self, user: &User, document_id: &str) -> Result<bool, EditorError>;
}

/// Dispatches access checks to the oracle owned by each document kind.
///
/// The gate runs twice per editing session: once before a token is issued
/// and again when the save callback arrives, because the callback is an
/// unauthenticated external call whose embedded user id must be re-checked.
#[derive(Clone)]
pub struct AuthorizationGate {
    candidates: Arc<dyn CapabilityOracle>,
    job_posts: Arc<dyn CapabilityOracle>,
}

impl AuthorizationGate {
    pub fn new(candidates: Arc<dyn CapabilityOracle>, job_posts: Arc<dyn CapabilityOracle>) -> Self {
        Self {
            candidates,
            job_posts,
        }
    }

    fn oracle(&self, kind: DocumentKind) -> &dyn CapabilityOracle {
        match kind {
            DocumentKind::Candidate => self.candidates.as_ref(),
            DocumentKind::JobPost => self.job_posts.as_ref(),
        }
    }

    pub async fn can_access(
        &self,
        user: &User,
        kind: DocumentKind,
        document_id: &str,
    ) -> Result<bool, EditorError> {
        self.oracle(kind).can_access(user, document_id).await
    }

    /// Like `can_access`, but a denial becomes `Forbidden`.
    pub async fn authorize(
        &self,
        user: &User,
        kind: DocumentKind,
        document_id: &str,
    ) -> Result<(), EditorError> {
        if self.can_access(user, kind, document_id).await? {
            Ok(())
        } else {
            tracing::warn!(
                user = %user.sub,
                kind = %kind,
                document_id = %document_id,
                "Access denied"
            );
            Err(EditorError::Forbidden {
                kind: kind.to_string(),
                document_id: document_id.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticOracle {
        allowed: bool,
        calls: AtomicUsize,
    }

    impl StaticOracle {
        fn new(allowed: bool) -> Arc<Self> {
            Arc::new(Self {
                allowed,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CapabilityOracle for StaticOracle {
        async fn can_access(&self, _user: &User, _document_id: &str) -> Result<bool, EditorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.allowed)
        }
    }

    fn user() -> User {
        User {
            sub: "u1".to_string(),
            email: "u1@example.com".to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn authorize_passes_when_oracle_allows() {
        let gate = AuthorizationGate::new(StaticOracle::new(true), StaticOracle::new(true));
        gate.authorize(&user(), DocumentKind::Candidate, "42")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn authorize_converts_denial_into_forbidden() {
        let gate = AuthorizationGate::new(StaticOracle::new(false), StaticOracle::new(true));
        let err = gate
            .authorize(&user(), DocumentKind::Candidate, "42")
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn each_kind_dispatches_to_its_own_oracle() {
        let candidates = StaticOracle::new(true);
        let job_posts = StaticOracle::new(true);
        let gate = AuthorizationGate::new(candidates.clone(), job_posts.clone());

        gate.can_access(&user(), DocumentKind::JobPost, "7")
            .await
            .unwrap();

        assert_eq!(candidates.calls.load(Ordering::SeqCst), 0);
        assert_eq!(job_posts.calls.load(Ordering::SeqCst), 1);
    }
}
