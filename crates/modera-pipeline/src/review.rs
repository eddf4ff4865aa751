// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The moderator review state machine (pure part).
//!
//! A flagged message starts `pending` (no decision row exists), receives
//! exactly one terminal action, and is `resolved` thereafter. Decisions
//! are append-only: resolving never mutates the message, and a resolved
//! message never re-enters the pending queue view.

use modera_core::{ModeraError, ModeratorAction};

/// Fixed prompt substituted by the `clarify` action.
pub const CLARIFICATION_PROMPT: &str = "Can you provide more details about your situation? This will help me give you a more accurate response.";

/// A moderator's requested action with its action-specific payload.
#[derive(Debug, Clone, Default)]
pub struct ReviewRequest {
    pub action: Option<ModeratorAction>,
    /// Required, non-empty, for `edit`.
    pub edited_response: Option<String>,
    /// Required, non-empty, for `reject`.
    pub alternative_response: Option<String>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub review_seconds: Option<f64>,
    /// Acting moderator identity; `None` for anonymous action.
    pub moderator: Option<String>,
}

/// The resolved outcome of applying an action to the original response.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResolution {
    pub action: ModeratorAction,
    /// What the end user receives.
    pub final_response: String,
    /// The replacement text recorded on the decision (edit/reject only).
    pub edited_response: Option<String>,
}

fn required_text(value: &Option<String>, what: &str) -> Result<String, ModeraError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.clone()),
        _ => Err(ModeraError::InvalidInput(format!("{what} is required"))),
    }
}

/// Validate an action request and resolve the final response text.
///
/// `approve` and `escalate` carry the original response forward unchanged;
/// `clarify` substitutes the fixed clarification prompt. Transition errors
/// surface before anything is computed or stored.
pub fn resolve_action(
    request: &ReviewRequest,
    original_response: &str,
) -> Result<ReviewResolution, ModeraError> {
    let action = request
        .action
        .ok_or_else(|| ModeraError::InvalidInput("unknown moderator action".into()))?;

    let (final_response, edited_response) = match action {
        ModeratorAction::Edit => {
            let edited = required_text(&request.edited_response, "edited_response for edit action")?;
            (edited.clone(), Some(edited))
        }
        ModeratorAction::Reject => {
            let alternative = required_text(
                &request.alternative_response,
                "alternative_response for reject action",
            )?;
            (alternative.clone(), Some(alternative))
        }
        ModeratorAction::Approve | ModeratorAction::Escalate => {
            (original_response.to_string(), None)
        }
        ModeratorAction::Clarify => (CLARIFICATION_PROMPT.to_string(), None),
    };

    Ok(ReviewResolution {
        action,
        final_response,
        edited_response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "the original generated reply";

    fn request(action: ModeratorAction) -> ReviewRequest {
        ReviewRequest {
            action: Some(action),
            ..Default::default()
        }
    }

    #[test]
    fn approve_carries_original_forward() {
        let r = resolve_action(&request(ModeratorAction::Approve), ORIGINAL).unwrap();
        assert_eq!(r.final_response, ORIGINAL);
        assert_eq!(r.edited_response, None);
    }

    #[test]
    fn escalate_carries_original_forward() {
        let r = resolve_action(&request(ModeratorAction::Escalate), ORIGINAL).unwrap();
        assert_eq!(r.final_response, ORIGINAL);
    }

    #[test]
    fn clarify_substitutes_fixed_prompt() {
        let r = resolve_action(&request(ModeratorAction::Clarify), ORIGINAL).unwrap();
        assert_eq!(r.final_response, CLARIFICATION_PROMPT);
    }

    #[test]
    fn edit_requires_non_empty_replacement() {
        let mut req = request(ModeratorAction::Edit);
        assert!(resolve_action(&req, ORIGINAL).is_err());

        req.edited_response = Some("   ".into());
        assert!(resolve_action(&req, ORIGINAL).is_err());

        req.edited_response = Some("a better reply".into());
        let r = resolve_action(&req, ORIGINAL).unwrap();
        assert_eq!(r.final_response, "a better reply");
        assert_eq!(r.edited_response.as_deref(), Some("a better reply"));
    }

    #[test]
    fn reject_requires_non_empty_alternative() {
        let mut req = request(ModeratorAction::Reject);
        assert!(resolve_action(&req, ORIGINAL).is_err());

        req.alternative_response = Some("a safer reply".into());
        let r = resolve_action(&req, ORIGINAL).unwrap();
        assert_eq!(r.final_response, "a safer reply");
        assert_eq!(r.edited_response.as_deref(), Some("a safer reply"));
    }

    #[test]
    fn missing_action_is_invalid_input() {
        let err = resolve_action(&ReviewRequest::default(), ORIGINAL).unwrap_err();
        assert!(matches!(err, ModeraError::InvalidInput(_)));
    }
}
