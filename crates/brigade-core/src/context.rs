//! Request context and view-generation tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BrigadeError, BrigadeResult};
use crate::models::membership::MemberRole;

/// Who is acting, and in which organization.
///
/// Built once per request from verified credentials and passed
/// explicitly to every service call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppContext {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
}

impl AppContext {
    pub fn require_admin(&self) -> BrigadeResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(BrigadeError::denied(format!(
                "{} role cannot administer the organization",
                self.role.as_str()
            )))
        }
    }
}

/// Monotonic counter identifying the latest state of a view.
///
/// Every mutation advances the generation. A reload takes a
/// [`ViewTicket`] before it starts fetching and may only publish its
/// result while the ticket is still current, so a slow response can
/// never replace state produced after it was requested.
#[derive(Debug, Clone, Default)]
pub struct ViewGeneration {
    current: Arc<AtomicU64>,
}

impl ViewGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn ticket(&self) -> ViewTicket {
        ViewTicket {
            generation: self.current(),
            source: Arc::clone(&self.current),
        }
    }

    /// Mark all outstanding tickets stale; returns the new generation.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invalidate outstanding tickets because the view was dropped.
    pub fn dismiss(&self) {
        self.advance();
    }
}

#[derive(Debug, Clone)]
pub struct ViewTicket {
    generation: u64,
    source: Arc<AtomicU64>,
}

impl ViewTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.source.load(Ordering::SeqCst) == self.generation
    }
}
