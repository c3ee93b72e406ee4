use serde::{Deserialize, Serialize};

/// A single literal find/replace pair.
///
/// Rules with empty find text are kept (the settings file may carry them) but
/// never change their input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub find: String,
    #[serde(default)]
    pub replace: String,
}

impl Rule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// True when the rule cannot change any input.
    pub fn is_noop(&self) -> bool {
        self.find.is_empty()
    }

    /// Replace every occurrence of `find` in `input`.
    pub fn apply(&self, input: &str) -> String {
        if self.is_noop() {
            input.to_string()
        } else {
            input.replace(&self.find, &self.replace)
        }
    }
}

/// Ordered list of find/replace rules.
///
/// Every rule runs, in insertion order, over the output of the rule before
/// it. There is no "first match wins": `[("a", "b"), ("b", "c")]` turns `"a"`
/// into `"c"`.
///
/// Serialized as a plain YAML sequence of `{find, replace}` maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule at the end of the application order.
    pub fn push(&mut self, find: impl Into<String>, replace: impl Into<String>) {
        self.rules.push(Rule::new(find, replace));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, find: impl Into<String>, replace: impl Into<String>) -> Self {
        self.push(find, replace);
        self
    }

    /// Remove the rule at `index`, returning it if it existed.
    pub fn remove(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Apply all rules in order. Returns `input` unchanged for an empty set.
    pub fn apply(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |acc, rule| rule.apply(&acc))
    }
}

impl<F, R> FromIterator<(F, R)> for RuleSet
where
    F: Into<String>,
    R: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, R)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(find, replace)| Rule::new(find, replace))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
