//! Resolves the configured author used to filter posts.
//!
//! A pinned user id is tried first. Otherwise the first page of users is
//! scanned for a name match. Lookup failures are logged and treated as "not
//! found", which the pipeline turns into a no-op run.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AuthorFilter;
use crate::connectors::ContentSource;
use crate::model::WpUser;

/// Users fetched for the name search.
pub const AUTHOR_SEARCH_LIMIT: usize = 100;

/// True if the user's name, slug or description contains any candidate,
/// ignoring case.
#[must_use]
pub fn matches_any(user: &WpUser, candidates: &[String]) -> bool {
    let fields: Vec<String> = [&user.name, &user.slug, &user.description]
        .into_iter()
        .flatten()
        .map(|f| f.to_lowercase())
        .collect();

    candidates
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .any(|c| fields.iter().any(|f| f.contains(&c)))
}

/// Looks up the author behind an [`AuthorFilter`].
pub struct AuthorResolver {
    source: Arc<dyn ContentSource>,
}

impl AuthorResolver {
    /// Creates a resolver reading users from `source`.
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Resolves the filter to a WordPress user id.
    pub async fn resolve(&self, filter: &AuthorFilter) -> Option<u64> {
        if let Some(id) = filter.id {
            if let Some(user) = self.resolve_by_id(id).await {
                info!(
                    "Using pinned author {} ({})",
                    user.id,
                    user.name.as_deref().unwrap_or("unnamed")
                );
                return Some(user.id);
            }
            debug!("Pinned author {} not found, searching by name", id);
        }
        self.resolve_by_name(&filter.names).await
    }

    /// Fetches a user by id.
    pub async fn resolve_by_id(&self, id: u64) -> Option<WpUser> {
        match self.source.fetch_user(id).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Failed to fetch author {}: {}", id, e);
                None
            }
        }
    }

    /// Returns the id of the first user, in API order, matching any of
    /// `candidates`.
    pub async fn resolve_by_name(&self, candidates: &[String]) -> Option<u64> {
        if candidates.iter().all(|c| c.trim().is_empty()) {
            return None;
        }

        let users = match self.source.list_users(AUTHOR_SEARCH_LIMIT).await {
            Ok(Some(users)) => users,
            Ok(None) => {
                warn!("User listing unavailable, cannot resolve author");
                return None;
            }
            Err(e) => {
                warn!("Failed to list users: {}", e);
                return None;
            }
        };

        match users.iter().find(|u| matches_any(u, candidates)) {
            Some(user) => {
                info!(
                    "Resolved author {} ({}) by name",
                    user.id,
                    user.name.as_deref().unwrap_or("unnamed")
                );
                Some(user.id)
            }
            None => {
                let available: Vec<String> = users
                    .iter()
                    .map(|u| format!("{} ({})", u.name.as_deref().unwrap_or("?"), u.id))
                    .collect();
                info!(
                    "No author matches {:?}; available authors: {}",
                    candidates,
                    available.join(", ")
                );
                None
            }
        }
    }
}
