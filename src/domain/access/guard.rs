//! Form-access guard.
//!
//! Runs once per page view: `Init → LoadingAccount → Evaluating → {Allowed | Blocked}`.
//! The guard is fail-secure. Any cached hint of a prior payment blocks
//! until a linked account is confirmed against the ledger.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EmailAddress, StateMachine, ValidationError};
use crate::domain::submission::AccountStanding;

use super::AccessState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Init,
    LoadingAccount,
    Evaluating,
    Allowed,
    Blocked,
}

impl StateMachine for GuardState {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use GuardState::*;
        match self {
            Init => vec![LoadingAccount],
            LoadingAccount => vec![Evaluating],
            Evaluating => vec![Allowed, Blocked],
            Allowed | Blocked => vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    /// No sign of a prior payment; the free tier applies.
    FirstTimeVisitor,
    LinkedAccount,
}

/// Why gated forms are hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockReason {
    /// This email has paid before; an account must be created to continue.
    AccountRequired { email: EmailAddress },
}

impl BlockReason {
    pub fn user_message(&self) -> String {
        match self {
            BlockReason::AccountRequired { .. } => {
                "Create an account to continue submitting forms.".to_string()
            }
        }
    }

    /// Signup destination carrying the email as context.
    pub fn signup_path(&self, base: &str) -> String {
        self.signup_path_with(base, &[])
    }

    /// Signup destination with extra query parameters after the email.
    pub fn signup_path_with(&self, base: &str, extra: &[(&str, &str)]) -> String {
        let BlockReason::AccountRequired { email } = self;
        let mut query = vec![format!("email={}", encode_query_value(email.as_str()))];
        query.extend(
            extra
                .iter()
                .map(|(k, v)| format!("{}={}", encode_query_value(k), encode_query_value(v))),
        );
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}", base, separator, query.join("&"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed { reason: AllowReason },
    Blocked { reason: BlockReason },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed { .. })
    }

    pub fn into_result(self) -> Result<AllowReason, BlockReason> {
        match self {
            AccessDecision::Allowed { reason } => Ok(reason),
            AccessDecision::Blocked { reason } => Err(reason),
        }
    }
}

/// Everything the guard needs once the account has been loaded.
#[derive(Debug, Clone)]
pub struct AccessInputs {
    pub standing: AccountStanding,
    /// Email of the signed-in account, if any.
    pub account_email: Option<EmailAddress>,
    /// Whether the ledger holds a succeeded payment for `account_email`.
    pub account_email_has_paid: bool,
    pub access_state: AccessState,
}

/// One evaluation of the form-access guard.
#[derive(Debug)]
pub struct AccessEvaluator {
    state: GuardState,
}

impl AccessEvaluator {
    pub fn new() -> Self {
        Self {
            state: GuardState::Init,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Enters `LoadingAccount`; the caller then resolves account standing.
    pub fn begin_loading(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(GuardState::LoadingAccount)?;
        Ok(())
    }

    /// Applies the access rules and settles in `Allowed` or `Blocked`.
    pub fn evaluate(&mut self, inputs: &AccessInputs) -> Result<AccessDecision, ValidationError> {
        self.state = self.state.transition_to(GuardState::Evaluating)?;

        let decision = Self::decide(inputs);
        let terminal = if decision.is_allowed() {
            GuardState::Allowed
        } else {
            GuardState::Blocked
        };
        self.state = self.state.transition_to(terminal)?;
        Ok(decision)
    }

    fn decide(inputs: &AccessInputs) -> AccessDecision {
        if inputs.standing.is_linked() {
            return AccessDecision::Allowed {
                reason: AllowReason::LinkedAccount,
            };
        }

        let cached = &inputs.access_state;
        if cached.requires_account() {
            let email = cached
                .cached_email
                .clone()
                .or_else(|| inputs.account_email.clone());
            if let Some(email) = email {
                return AccessDecision::Blocked {
                    reason: BlockReason::AccountRequired { email },
                };
            }
        }

        if inputs.account_email_has_paid {
            if let Some(email) = inputs.account_email.clone() {
                return AccessDecision::Blocked {
                    reason: BlockReason::AccountRequired { email },
                };
            }
        }

        AccessDecision::Allowed {
            reason: AllowReason::FirstTimeVisitor,
        }
    }
}

impl Default for AccessEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    fn inputs() -> AccessInputs {
        AccessInputs {
            standing: AccountStanding::Anonymous,
            account_email: None,
            account_email_has_paid: false,
            access_state: AccessState::default(),
        }
    }

    fn run(inputs: &AccessInputs) -> (AccessDecision, GuardState) {
        let mut guard = AccessEvaluator::new();
        guard.begin_loading().unwrap();
        let decision = guard.evaluate(inputs).unwrap();
        (decision, guard.state())
    }

    // ══════════════════════════════════════════════════════════════
    // Decision rules
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn anonymous_visitor_without_cache_is_allowed() {
        let (decision, state) = run(&inputs());
        assert_eq!(
            decision,
            AccessDecision::Allowed {
                reason: AllowReason::FirstTimeVisitor
            }
        );
        assert_eq!(state, GuardState::Allowed);
    }

    #[test]
    fn cached_email_without_account_is_blocked() {
        let mut i = inputs();
        i.access_state.mark_paid_pending_account(email("a@x.com"));

        let (decision, state) = run(&i);
        assert_eq!(
            decision,
            AccessDecision::Blocked {
                reason: BlockReason::AccountRequired {
                    email: email("a@x.com")
                }
            }
        );
        assert_eq!(state, GuardState::Blocked);
    }

    #[test]
    fn cached_email_with_unlinked_account_is_blocked() {
        let mut i = inputs();
        i.standing = AccountStanding::Unlinked;
        i.account_email = Some(email("a@x.com"));
        i.access_state.cached_email = Some(email("a@x.com"));

        assert!(!run(&i).0.is_allowed());
    }

    #[test]
    fn linked_account_is_allowed_even_with_cache() {
        let mut i = inputs();
        i.standing = AccountStanding::Linked;
        i.access_state.mark_paid_pending_account(email("a@x.com"));

        assert_eq!(
            run(&i).0,
            AccessDecision::Allowed {
                reason: AllowReason::LinkedAccount
            }
        );
    }

    #[test]
    fn unlinked_account_whose_email_paid_is_blocked() {
        let mut i = inputs();
        i.standing = AccountStanding::Unlinked;
        i.account_email = Some(email("b@x.com"));
        i.account_email_has_paid = true;

        let decision = run(&i).0;
        assert_eq!(
            decision.into_result().unwrap_err(),
            BlockReason::AccountRequired {
                email: email("b@x.com")
            }
        );
    }

    // ══════════════════════════════════════════════════════════════
    // State machine
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn evaluate_before_loading_is_rejected() {
        let mut guard = AccessEvaluator::new();
        assert!(guard.evaluate(&inputs()).is_err());
        assert_eq!(guard.state(), GuardState::Init);
    }

    #[test]
    fn guard_cannot_be_reused_after_decision() {
        let mut guard = AccessEvaluator::new();
        guard.begin_loading().unwrap();
        guard.evaluate(&inputs()).unwrap();
        assert!(guard.begin_loading().is_err());
    }

    #[test]
    fn signup_path_encodes_email() {
        let reason = BlockReason::AccountRequired {
            email: email("a+tag@x.com"),
        };
        assert_eq!(reason.signup_path("/signup"), "/signup?email=a%2Btag%40x.com");
    }

    #[test]
    fn signup_path_appends_extra_parameters() {
        let reason = BlockReason::AccountRequired {
            email: email("a@x.com"),
        };
        assert_eq!(
            reason.signup_path_with("/signup", &[("paymentId", "pay 1")]),
            "/signup?email=a%40x.com&paymentId=pay%201"
        );
        assert_eq!(
            reason.signup_path("/signup?ref=nudge"),
            "/signup?ref=nudge&email=a%40x.com"
        );
    }
}
