//! Identity-to-role derivation policies.
//!
//! # Responsibility
//! - Keep the mapping from identity to role injectable.
//! - Provide a rule-based email policy driven by configuration.
//!
//! # Invariants
//! - Policies never fail; anything unrecognized is `Role::Unknown`.

use crate::model::user::{Role, User};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Derives a role from an authenticated identity.
pub trait RolePolicy: Send + Sync {
    fn derive(&self, user: &User) -> Role;
}

impl<F> RolePolicy for F
where
    F: Fn(&User) -> Role + Send + Sync,
{
    fn derive(&self, user: &User) -> Role {
        self(user)
    }
}

/// One declarative rule: identities whose email matches `pattern` get `role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub pattern: String,
    pub role: Role,
}

impl RoleRule {
    pub fn new(pattern: impl Into<String>, role: Role) -> Self {
        Self {
            pattern: pattern.into(),
            role,
        }
    }
}

/// Ordered regex rules over the identity's email; first match wins.
#[derive(Debug, Clone, Default)]
pub struct EmailPatternPolicy {
    rules: Vec<(Regex, Role)>,
}

impl EmailPatternPolicy {
    /// Compiles `rules` in declaration order.
    pub fn new(rules: &[RoleRule]) -> Result<Self, RolePatternError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = Regex::new(&rule.pattern).map_err(|err| RolePatternError {
                pattern: rule.pattern.clone(),
                message: err.to_string(),
            })?;
            compiled.push((regex, rule.role));
        }
        Ok(Self { rules: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RolePolicy for EmailPatternPolicy {
    fn derive(&self, user: &User) -> Role {
        let Some(email) = user.email() else {
            return Role::Unknown;
        };
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(email.trim()))
            .map_or(Role::Unknown, |(_, role)| *role)
    }
}

/// Rule pattern that does not compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePatternError {
    pub pattern: String,
    pub message: String,
}

impl Display for RolePatternError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid role pattern `{}`: {}",
            self.pattern, self.message
        )
    }
}

impl Error for RolePatternError {}

#[cfg(test)]
mod tests {
    use super::{EmailPatternPolicy, RolePolicy, RoleRule};
    use crate::model::user::{Role, User};

    fn policy() -> EmailPatternPolicy {
        EmailPatternPolicy::new(&[
            RoleRule::new(r"@faculty\.example$", Role::Teacher),
            RoleRule::new(r"@example$", Role::Student),
        ])
        .expect("rules compile")
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = policy();
        assert_eq!(
            policy.derive(&User::new("1").with_email("a@faculty.example")),
            Role::Teacher
        );
        assert_eq!(
            policy.derive(&User::new("2").with_email("b@example")),
            Role::Student
        );
    }

    #[test]
    fn unmatched_or_missing_email_is_unknown() {
        let policy = policy();
        assert_eq!(
            policy.derive(&User::new("3").with_email("c@elsewhere.test")),
            Role::Unknown
        );
        assert_eq!(policy.derive(&User::new("4")), Role::Unknown);
    }

    #[test]
    fn empty_policy_maps_everyone_to_unknown() {
        let policy = EmailPatternPolicy::new(&[]).expect("empty rules");
        assert!(policy.is_empty());
        assert_eq!(
            policy.derive(&User::new("5").with_email("d@example")),
            Role::Unknown
        );
    }

    #[test]
    fn closures_are_policies() {
        let always_teacher = |_: &User| Role::Teacher;
        assert_eq!(always_teacher.derive(&User::new("6")), Role::Teacher);
    }
}
