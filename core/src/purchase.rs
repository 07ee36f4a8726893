//! Purchases and their status state machine.
//!
//! ```text
//! pending ──► completed
//!    │
//!    └──────► failed
//! ```
//!
//! Terminal states are write-once.

use crate::error::{Error, Result};
use crate::ids::{PurchaseId, RecipeId, UserId};
use crate::recipe::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Purchase status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    /// Checkout started, outcome unknown
    Pending,
    /// Provider confirmed payment
    Completed,
    /// Provider reported anything other than success
    Failed,
}

impl PurchaseStatus {
    /// Database / wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Completed and failed never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only `pending → completed` and `pending → failed` are allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed | Self::Failed)
        )
    }

    /// The terminal state for a provider verdict.
    #[must_use]
    pub const fn from_verdict(success: bool) -> Self {
        if success { Self::Completed } else { Self::Failed }
    }

    /// Applies a transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the transition is not allowed.
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::conflict(format!(
                "purchase cannot move from {self} to {next}"
            )))
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(Error::Integrity(format!("unknown purchase status '{other}'"))),
        }
    }
}

/// A purchase row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Identifier
    pub id: PurchaseId,
    /// Buyer
    pub user_id: UserId,
    /// Recipe bought
    pub recipe_id: RecipeId,
    /// Amount charged
    pub amount: Money,
    /// Provider transaction reference, set once checkout is initialized
    pub tx_ref: Option<String>,
    /// Current status
    pub status: PurchaseStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// A purchase listed with the recipe it bought.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSummary {
    /// The purchase
    #[serde(flatten)]
    pub purchase: Purchase,
    /// Recipe title
    pub recipe_title: String,
    /// Recipe featured image
    pub recipe_image_url: Option<String>,
}

/// Generates a provider transaction reference for `recipe`.
///
/// # Examples
///
/// ```
/// # use recipe_hub_core::{purchase::generate_tx_ref, RecipeId};
/// let recipe = RecipeId::new();
/// assert!(generate_tx_ref(recipe).starts_with(&format!("recipe-{recipe}-")));
/// ```
#[must_use]
pub fn generate_tx_ref(recipe: RecipeId) -> String {
    format!("recipe-{recipe}-{}", Uuid::new_v4())
}
