//! Pattern-triggered materialization of typed text into atomic nodes.
//!
//! Rules are registered once and consulted on every text-insertion event
//! against the text immediately preceding the cursor. The first rule whose
//! end-anchored pattern matches and whose guard passes wins; the engine
//! answers with the span to delete and the atom to insert in its place.
//! Guard rejection is not an error; rejected text such as `"$1.00 and $"`
//! simply stays plain.

use regex::{Captures, Regex};
use std::ops::Range;

use crate::model::{Attrs, AtomNode, NodeKind};

pub type AttrsFn = Box<dyn Fn(&Captures) -> Attrs + Send + Sync>;
pub type ContentFn = Box<dyn Fn(&Captures) -> Option<String> + Send + Sync>;
pub type GuardFn = Box<dyn Fn(&Captures) -> bool + Send + Sync>;

/// Whether the selection moves onto the freshly created node.
pub enum SelectAfter {
    Never,
    Always,
    When(Box<dyn Fn(&Captures) -> bool + Send + Sync>),
}

/// A single registered materialization rule.
///
/// Extractors and guards are pure functions of the regex captures, so they
/// can be unit-tested without constructing a document.
pub struct PatternRule {
    pattern: Regex,
    target: NodeKind,
    attrs: Option<AttrsFn>,
    content: Option<ContentFn>,
    select_after: SelectAfter,
    guard: Option<GuardFn>,
}

impl PatternRule {
    /// `pattern` must be anchored at the end (`$`) so matches always touch
    /// the cursor.
    pub fn new(pattern: Regex, target: NodeKind) -> Self {
        Self {
            pattern,
            target,
            attrs: None,
            content: None,
            select_after: SelectAfter::Never,
            guard: None,
        }
    }

    pub fn with_attrs(mut self, f: impl Fn(&Captures) -> Attrs + Send + Sync + 'static) -> Self {
        self.attrs = Some(Box::new(f));
        self
    }

    pub fn with_content(
        mut self,
        f: impl Fn(&Captures) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.content = Some(Box::new(f));
        self
    }

    pub fn with_guard(mut self, f: impl Fn(&Captures) -> bool + Send + Sync + 'static) -> Self {
        self.guard = Some(Box::new(f));
        self
    }

    pub fn select_after(mut self, select: SelectAfter) -> Self {
        self.select_after = select;
        self
    }
}

/// The replacement a matched rule asks for: delete `range`, insert `node`
/// at its start, optionally select the new node.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialization {
    pub range: Range<usize>,
    pub node: AtomNode,
    pub select: bool,
}

/// Ordered rule list, consulted per keystroke. First match wins.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    /// Try every rule in registration order against `window`, the text
    /// immediately preceding the cursor; `cursor` is the document offset of
    /// the window's end. A guard returning false skips that rule only.
    pub fn match_input(&self, window: &str, cursor: usize) -> Option<Materialization> {
        for rule in &self.rules {
            let Some(caps) = rule.pattern.captures(window) else {
                continue;
            };
            let Some(matched) = caps.get(0) else {
                continue;
            };
            // the match must end at the cursor
            if matched.end() != window.len() {
                continue;
            }
            if let Some(guard) = &rule.guard
                && !guard(&caps)
            {
                continue;
            }
            let attrs = rule.attrs.as_ref().map(|f| f(&caps)).unwrap_or_default();
            let content = rule
                .content
                .as_ref()
                .and_then(|f| f(&caps))
                .unwrap_or_default();
            let select = match &rule.select_after {
                SelectAfter::Never => false,
                SelectAfter::Always => true,
                SelectAfter::When(f) => f(&caps),
            };
            let start = cursor - (window.len() - matched.start());
            return Some(Materialization {
                range: start..cursor,
                node: AtomNode {
                    kind: rule.target,
                    attrs,
                    content,
                },
                select,
            });
        }
        None
    }
}

/// `$...$` becomes an inline formula node.
///
/// The guard rejects currency-looking spans: content starting with a digit
/// or ending with whitespace or an opening paren does not materialize. An
/// empty `$$` still produces an empty formula node.
pub fn formula_rule() -> PatternRule {
    let pattern = Regex::new(r"\$([^$]*)\$$").expect("Invalid formula pattern");
    PatternRule::new(pattern, NodeKind::Formula)
        .with_content(|caps| {
            let inner = caps.get(1)?.as_str();
            (!inner.is_empty()).then(|| inner.to_string())
        })
        .with_guard(|caps| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            if inner.is_empty() {
                return true;
            }
            let starts_with_digit = inner.chars().next().is_some_and(|c| c.is_ascii_digit());
            let ends_open = inner
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace() || c == '(');
            !(starts_with_digit || ends_open)
        })
}

/// The rule list the engine ships with.
pub fn default_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.register(formula_rule());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn formula_set() -> RuleSet {
        default_rules()
    }

    #[test]
    fn test_formula_materializes_delimited_span() {
        let rules = formula_set();
        let window = "see $a=b$";

        let mat = rules.match_input(window, window.len()).unwrap();

        assert_eq!(mat.range, 4..9);
        assert_eq!(mat.node.kind, NodeKind::Formula);
        assert_eq!(mat.node.content, "a=b");
        assert!(!mat.select);
    }

    #[rstest]
    #[case("$1.00 and $")] // starts with a digit
    #[case("price $2$")] // starts with a digit
    #[case("$1.00 and ($")] // ends with an opening paren
    #[case("$a $")] // ends with whitespace
    fn test_guard_rejects_currency_like_spans(#[case] window: &str) {
        let rules = formula_set();
        assert_eq!(rules.match_input(window, window.len()), None);
    }

    #[test]
    fn test_empty_delimiters_materialize_empty_formula() {
        let rules = formula_set();
        let window = "empty $$";

        let mat = rules.match_input(window, window.len()).unwrap();

        assert_eq!(mat.node.content, "");
        assert_eq!(mat.range, 6..8);
    }

    #[test]
    fn test_no_match_when_pattern_does_not_touch_cursor() {
        let rules = formula_set();
        assert_eq!(rules.match_input("no delimiters here", 18), None);
        assert_eq!(rules.match_input("$a$ trailing", 12), None);
    }

    #[test]
    fn test_range_offsets_follow_cursor_position() {
        let rules = formula_set();
        // window is a suffix of a larger document; cursor sits at 107
        let mat = rules.match_input("tail $x$", 107).unwrap();
        assert_eq!(mat.range, 104..107);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut rules = RuleSet::new();
        rules.register(
            PatternRule::new(Regex::new(r"\$([^$]*)\$$").unwrap(), NodeKind::Formula)
                .with_content(|caps| Some(format!("first:{}", &caps[1]))),
        );
        rules.register(
            PatternRule::new(Regex::new(r"\$([^$]*)\$$").unwrap(), NodeKind::Formula)
                .with_content(|caps| Some(format!("second:{}", &caps[1]))),
        );

        let mat = rules.match_input("$x$", 3).unwrap();
        assert_eq!(mat.node.content, "first:x");
    }

    #[test]
    fn test_guard_rejection_falls_through_to_next_rule() {
        let mut rules = RuleSet::new();
        rules.register(
            PatternRule::new(Regex::new(r"\$([^$]*)\$$").unwrap(), NodeKind::Formula)
                .with_guard(|_| false)
                .with_content(|_| Some("guarded".to_string())),
        );
        rules.register(
            PatternRule::new(Regex::new(r"\$([^$]*)\$$").unwrap(), NodeKind::Formula)
                .with_content(|caps| Some(caps[1].to_string())),
        );

        let mat = rules.match_input("$y$", 3).unwrap();
        assert_eq!(mat.node.content, "y");
    }

    #[test]
    fn test_select_after_predicate() {
        let mut rules = RuleSet::new();
        rules.register(
            PatternRule::new(Regex::new(r"\$([^$]*)\$$").unwrap(), NodeKind::Formula)
                .with_content(|caps| Some(caps[1].to_string()))
                .select_after(SelectAfter::When(Box::new(|caps| !caps[1].is_empty()))),
        );

        assert!(rules.match_input("$x$", 3).unwrap().select);
        assert!(!rules.match_input("$$", 2).unwrap().select);
    }

    #[test]
    fn test_attrs_extractor() {
        let mut rules = RuleSet::new();
        rules.register(
            PatternRule::new(Regex::new(r"(#+)>$").unwrap(), NodeKind::Heading)
                .with_attrs(|caps| Attrs::leveled(caps[1].len() as u8)),
        );

        let mat = rules.match_input("###>", 4).unwrap();
        assert_eq!(mat.node.attrs.level, Some(3));
    }
}
