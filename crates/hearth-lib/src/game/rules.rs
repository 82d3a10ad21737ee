/// Conditional allow/disallow rules for libraries and arguments
use crate::game::platform::PlatformDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rule for conditional arguments/libraries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
            features: None,
        }
    }

    pub fn disallow() -> Self {
        Self {
            action: RuleAction::Disallow,
            os: None,
            features: None,
        }
    }

    pub fn for_os(mut self, name: &str) -> Self {
        self.os = Some(OsRule {
            name: Some(name.to_string()),
            ..OsRule::default()
        });
        self
    }
}

impl OsRule {
    /// Every present field must match. `version` is not checked, so a
    /// constraint carrying neither `name` nor `arch` matches nothing.
    fn matches(&self, platform: &PlatformDescriptor) -> bool {
        if self.name.is_none() && self.arch.is_none() {
            return false;
        }

        if let Some(ref name) = self.name {
            if !platform.os.matches_name(name) {
                return false;
            }
        }

        if let Some(ref arch) = self.arch {
            if !platform.matches_arch(arch) {
                return false;
            }
        }

        true
    }
}

/// Evaluate a rule list against a platform.
///
/// An empty list allows. Otherwise the rules fold left to right over a running
/// value that starts at `false`, so the last matching rule wins:
/// - `allow` with no OS constraint, or a matching one, sets it to `true`
/// - `disallow` with a matching OS constraint sets it to `false`
/// - `disallow` with no OS constraint changes nothing
/// - rules carrying feature constraints are skipped entirely
pub fn evaluate(rules: &[Rule], platform: &PlatformDescriptor) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;

    for rule in rules {
        if rule.features.is_some() {
            continue;
        }

        match (rule.action, &rule.os) {
            (RuleAction::Allow, None) => allowed = true,
            (RuleAction::Allow, Some(os)) => {
                if os.matches(platform) {
                    allowed = true;
                }
            }
            (RuleAction::Disallow, Some(os)) => {
                if os.matches(platform) {
                    allowed = false;
                }
            }
            (RuleAction::Disallow, None) => {}
        }
    }

    allowed
}
