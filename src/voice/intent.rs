/// Transcript-to-search intent extraction
///
/// Every transcript line is run through an ordered rule table. The first rule
/// that reaches a verdict decides; later rules are never consulted. The order
/// of the table is the precedence contract:
///
/// 1. assistant lines are ignored
/// 2. deny-list phrases veto the line
/// 3. trigger patterns, in their listed order
/// 4. the cleaned utterance itself, when long enough
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::models::Origin;

/// Captures shorter than this are noise
pub const MIN_PHRASE_CHARS: usize = 3;

/// Phrases that mark a line as boilerplate rather than a command
pub const DENY_LIST: &[&str] = &[
    "sorry",
    "i apologize",
    "could you repeat",
    "can you repeat",
    "what do you mean",
    "i didn't catch",
    "i did not catch",
    "i don't understand",
    "could you clarify",
    "how can i help",
    "how can i assist",
    "i can help",
    "let me help",
    "is there anything else",
    "happy to help",
];

/// `(name, pattern)` pairs, matched against the lower-cased line in this order
///
/// The capture is optional so a bare verb ("find.") stops at its trigger with
/// no action instead of reaching the fallback.
const TRIGGERS: &[(&str, &str)] = &[
    ("search for", r"\bsearch for\b\s*(.*)"),
    ("find", r"\bfind\b\s*(.*)"),
    ("show me", r"\bshow me\b\s*(.*)"),
    ("look for", r"\blook for\b\s*(.*)"),
    ("movie", r"\bmovie\b\s*(.*)"),
    ("film", r"\bfilm\b\s*(.*)"),
    ("watch", r"\bwatch\b\s*(.*)"),
    ("recommend", r"\brecommend\b\s*(.*)"),
];

const LEADING_FILLER: &[&str] = &["please ", "can you ", "could you ", "would you ", "hey "];

/// A cleaned line made only of these words is an acknowledgement, not a title
const ACKNOWLEDGEMENTS: &[&str] = &[
    "please", "thanks", "thank", "you", "okay", "ok", "yes", "yeah", "yep", "no", "nope", "sure",
    "alright", "great", "cool", "right", "hi", "hello", "hey", "bye", "goodbye",
];

static TRIGGER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TRIGGERS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).expect("trigger pattern is valid")))
        .collect()
});

/// What a transcript line asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "query", rename_all = "snake_case")]
pub enum Intent {
    NoAction,
    Search(String),
}

impl Intent {
    pub fn query(&self) -> Option<&str> {
        match self {
            Intent::Search(q) => Some(q),
            Intent::NoAction => None,
        }
    }
}

/// One entry of the rule table
#[derive(Debug)]
pub enum Rule {
    /// Lines from this origin never trigger anything
    IgnoreOrigin(Origin),
    /// Lines containing this phrase never trigger anything
    Deny(&'static str),
    /// `<verb phrase> <capture>`; the capture is the search phrase
    Trigger {
        name: &'static str,
        pattern: &'static Regex,
    },
    /// The cleaned line is the search phrase
    Fallback,
}

struct Utterance<'a> {
    origin: Origin,
    lowered: &'a str,
}

impl Rule {
    /// `None` means "not my call, try the next rule"
    fn apply(&self, utterance: &Utterance<'_>) -> Option<Intent> {
        match self {
            Rule::IgnoreOrigin(origin) => (utterance.origin == *origin).then_some(Intent::NoAction),
            Rule::Deny(phrase) => utterance.lowered.contains(phrase).then_some(Intent::NoAction),
            Rule::Trigger { pattern, .. } => {
                let captures = pattern.captures(utterance.lowered)?;
                let phrase = tidy_capture(captures.get(1)?.as_str());
                Some(phrase_intent(phrase))
            }
            Rule::Fallback => Some(phrase_intent(clean_utterance(utterance.lowered))),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Rule::IgnoreOrigin(origin) => format!("ignore:{:?}", origin).to_lowercase(),
            Rule::Deny(phrase) => format!("deny:{}", phrase),
            Rule::Trigger { name, .. } => format!("trigger:{}", name),
            Rule::Fallback => "fallback".to_string(),
        }
    }
}

fn phrase_intent(phrase: String) -> Intent {
    if phrase.chars().count() < MIN_PHRASE_CHARS {
        Intent::NoAction
    } else {
        Intent::Search(phrase)
    }
}

/// Trims whitespace, closing punctuation and quotes from a capture
fn tidy_capture(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '?' | '!' | ',' | ';'))
        .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
        .to_string()
}

/// Strips punctuation, repeated whitespace and leading filler
fn clean_utterance(lowered: &str) -> String {
    let kept: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '\'' | '-' | ':' | '&') {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut cleaned = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    while let Some(filler) = LEADING_FILLER.iter().find(|f| cleaned.starts_with(**f)) {
        cleaned = cleaned[filler.len()..].to_string();
    }
    if let Some(stripped) = cleaned.strip_suffix(" please") {
        cleaned = stripped.to_string();
    }

    if cleaned
        .split(' ')
        .all(|word| ACKNOWLEDGEMENTS.contains(&word))
    {
        return String::new();
    }

    cleaned
}

/// Maps transcript lines to search intents
#[derive(Debug)]
pub struct IntentExtractor {
    rules: Vec<Rule>,
}

impl Default for IntentExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IntentExtractor {
    /// Builds the standard table; `fallback` appends the cleaned-utterance rule
    pub fn new(fallback: bool) -> Self {
        let mut rules = vec![Rule::IgnoreOrigin(Origin::Assistant)];
        rules.extend(DENY_LIST.iter().map(|phrase| Rule::Deny(*phrase)));
        rules.extend(
            TRIGGER_PATTERNS
                .iter()
                .map(|(name, pattern)| Rule::Trigger {
                    name: *name,
                    pattern,
                }),
        );
        if fallback {
            rules.push(Rule::Fallback);
        }
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn extract(&self, text: &str, origin: Origin) -> Intent {
        let lowered = text.to_lowercase();
        let utterance = Utterance {
            origin,
            lowered: &lowered,
        };

        for rule in &self.rules {
            if let Some(intent) = rule.apply(&utterance) {
                tracing::debug!(rule = %rule.label(), intent = ?intent, "Transcript rule matched");
                return intent;
            }
        }

        Intent::NoAction
    }
}
