//! Short reference name expansion.
//!
//! A name such as `stable` is tried against each rule in order, `%s` being
//! replaced by the name. The first rule naming an existing reference wins.

use tracing::debug;

/// Git config key holding whitespace or comma separated rules
pub const REF_RULES_CONFIG_KEY: &str = "gerrit-cherry.refRules";

/// git's own rev-parse order, then the usual Gerrit remote
pub const DEFAULT_REF_RULES: &[&str] = &[
    "%s",
    "refs/%s",
    "refs/tags/%s",
    "refs/heads/%s",
    "refs/remotes/%s",
    "refs/remotes/%s/HEAD",
    "refs/remotes/origin/%s",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRules {
    rules: Vec<String>,
}

impl Default for RefRules {
    fn default() -> Self {
        Self::new(DEFAULT_REF_RULES.iter().copied())
    }
}

impl RefRules {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RefRules {
            rules: rules.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a config value like `refs/heads/%s, refs/remotes/gerrit/%s`
    pub fn parse(value: &str) -> Option<Self> {
        let rules: Vec<&str> = value
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|rule| !rule.is_empty())
            .collect();
        if rules.is_empty() {
            None
        } else {
            Some(Self::new(rules))
        }
    }

    /// Rules configured under [`REF_RULES_CONFIG_KEY`], if any
    pub fn from_config(config: &git2::Config) -> Option<Self> {
        let value = config.get_string(REF_RULES_CONFIG_KEY).ok()?;
        let rules = Self::parse(&value);
        if let Some(rules) = &rules {
            debug!("Using {} ref rules from git config", rules.rules.len());
        }
        rules
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Full reference names to try for `name`, in priority order
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let candidate = rule.replace("%s", name);
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }
}
