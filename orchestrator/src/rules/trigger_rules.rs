// orchestrator/src/rules/trigger_rules.rs

use regex::{Regex, RegexBuilder};

/// Added to an already-positive score when the conversation is clearly ongoing.
pub const CONTEXT_BOOST: f64 = 0.1;
pub const CONTEXT_BOOST_LABEL: &str = "ongoing_conversation";
/// The boost needs more than this many recent messages.
pub const CONTEXT_MIN_MESSAGES: usize = 2;
/// How many of the latest messages are inspected for a long one.
pub const CONTEXT_WINDOW: usize = 3;
/// Content length (in chars) that counts as a substantial message.
pub const CONTEXT_LONG_MESSAGE_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Explicit,
    Implicit,
    Skip,
}

#[derive(Debug, Clone)]
pub struct TriggerRule {
    pub pattern: Regex,
    /// Signed, within [-1, 1]. Positive for memory signals, negative for skip signals.
    pub weight: f64,
    pub label: &'static str,
}

impl TriggerRule {
    pub fn new(pattern: &str, weight: f64, label: &'static str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern, weight: weight.clamp(-1.0, 1.0), label })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

// (pattern, weight, label)
type RuleDef = (&'static str, f64, &'static str);

// --- Explicit: the user directly refers to something said before ---
const EXPLICIT_RULES: &[RuleDef] = &[
    (r"\b(remember|recall|remind me)\b", 0.95, "explicit_remember"),
    (r"\b(last time|previously|the other day|earlier today)\b", 0.9, "explicit_past_reference"),
    (r"\b(you (told|said|mentioned|promised)|i (told|said|mentioned) (you|before)|as i said)\b", 0.9, "explicit_said_before"),
    (r"\b(we (talked|discussed|spoke|agreed)|our (last|previous) (chat|conversation|talk))\b", 0.9, "explicit_discussed"),
    (r"(пам['’]ятаєш|запам['’]ятай|нагадай|згадай|пригадай)", 0.95, "explicit_remember_uk"),
    (r"(минулого разу|минулий раз|раніше ти|того разу)", 0.9, "explicit_past_reference_uk"),
    (r"(ти (казав|казала|говорив|говорила|обіцяв|обіцяла)|я (казав|казала|говорив|говорила) тобі)", 0.9, "explicit_said_before_uk"),
    (r"(ми (говорили|обговорювали|домовилися|домовлялися))", 0.9, "explicit_discussed_uk"),
];

// --- Implicit: personal or continuing context that memory probably helps with ---
const IMPLICIT_RULES: &[RuleDef] = &[
    (r"\bmy (project|work|job|team|company|family|wife|husband|kids?|dog|cat|name|birthday|plan|goal)s?\b", 0.6, "implicit_personal"),
    (r"\b(as usual|like before|same as (before|last)|again)\b", 0.55, "implicit_continuation"),
    (r"\b(continue|keep going|where were we|pick up where)\b", 0.6, "implicit_resume"),
    (r"\b(what did i|did i (tell|mention|say))\b", 0.7, "implicit_self_question"),
    (r"\b(my (preferences?|favorite|favourite|usual))\b", 0.65, "implicit_preference"),
    (r"(мій|моя|моє|мої) (проєкт|проект|робот|команд|сім['’]|друж|чолов|діт|собак|кіт|ім['’]я|план|ціл)", 0.6, "implicit_personal_uk"),
    (r"(як завжди|як раніше|знову|ще раз)", 0.55, "implicit_continuation_uk"),
    (r"(продовж|продовжимо|на чому ми зупинилися)", 0.6, "implicit_resume_uk"),
];

// --- Skip: small talk and self-contained requests ---
const SKIP_RULES: &[RuleDef] = &[
    (r"^\s*(hi|hello|hey|yo|good (morning|afternoon|evening))\b", -0.9, "skip_greeting"),
    (r"^\s*(thanks|thank you|thx|ok|okay|cool|great|nice|got it|sure)\b", -0.9, "skip_acknowledgement"),
    (r"^\s*(bye|goodbye|see you|good night)\b", -0.9, "skip_farewell"),
    (r"^\s*(привіт|вітаю|добрий (день|ранок|вечір)|здоров)\b", -0.9, "skip_greeting_uk"),
    (r"^\s*(дякую|спасибі|ок|окей|добре|гаразд|зрозуміло|супер)\b", -0.9, "skip_acknowledgement_uk"),
    (r"^\s*(бувай|до побачення|на добраніч)\b", -0.9, "skip_farewell_uk"),
    (r"^\s*(translate|переклади)\b", -0.7, "skip_translation"),
    (r"^\s*(what is|what's|define|who (is|was)|що таке|хто такий)\b", -0.5, "skip_general_knowledge"),
    (r"^\s*(calculate|compute|порахуй|обчисли)\b|^[\d\s+\-*/().=^%]+$", -0.7, "skip_calculation"),
];

/// The full, ordered catalogue: explicit, implicit and skip groups.
#[derive(Debug, Clone)]
pub struct TriggerRuleSet {
    pub explicit: Vec<TriggerRule>,
    pub implicit: Vec<TriggerRule>,
    pub skip: Vec<TriggerRule>,
}

impl TriggerRuleSet {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            explicit: compile(EXPLICIT_RULES)?,
            implicit: compile(IMPLICIT_RULES)?,
            skip: compile(SKIP_RULES)?,
        })
    }

    pub fn group(&self, category: RuleCategory) -> &[TriggerRule] {
        match category {
            RuleCategory::Explicit => &self.explicit,
            RuleCategory::Implicit => &self.implicit,
            RuleCategory::Skip => &self.skip,
        }
    }

    pub fn len(&self) -> usize {
        self.explicit.len() + self.implicit.len() + self.skip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn compile(defs: &[RuleDef]) -> Result<Vec<TriggerRule>, regex::Error> {
    defs
        .iter()
        .map(|&(pattern, weight, label)| TriggerRule::new(pattern, weight, label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_compiles() {
        let rules = TriggerRuleSet::new().unwrap();
        assert_eq!(rules.len(), EXPLICIT_RULES.len() + IMPLICIT_RULES.len() + SKIP_RULES.len());
        assert!(!rules.is_empty());
    }

    #[test]
    fn weights_have_the_sign_of_their_group() {
        let rules = TriggerRuleSet::new().unwrap();
        assert!(rules.group(RuleCategory::Explicit).iter().all(|r| r.weight >= 0.85));
        assert!(rules.group(RuleCategory::Implicit).iter().all(|r| r.weight > 0.0 && r.weight < 0.9));
        assert!(rules.group(RuleCategory::Skip).iter().all(|r| r.weight < 0.0));
    }

    #[test]
    fn labels_are_unique() {
        let rules = TriggerRuleSet::new().unwrap();
        let mut labels: Vec<&str> = [RuleCategory::Explicit, RuleCategory::Implicit, RuleCategory::Skip]
            .iter()
            .flat_map(|c| rules.group(*c).iter().map(|r| r.label))
            .collect();
        let total = labels.len();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), total);
    }

    #[test]
    fn skip_rules_are_anchored_at_the_start() {
        let rules = TriggerRuleSet::new().unwrap();
        let greeting = &rules.skip[0];
        assert!(greeting.matches("Hi there"));
        assert!(!greeting.matches("I said hi to him yesterday"));
        assert!(!greeting.matches("history lesson"));
    }
}
