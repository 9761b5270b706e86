//! Patterns - Keyword and regex tables that drive classification
//!
//! Every phrase the classifier reacts to lives here rather than inline in
//! the predicates. Tables are plain serde data (`PatternTables`) so they can
//! be loaded from TOML, then compiled once into `CompiledPatterns`, which is
//! immutable and shared by every classification.
//!
//! Matching rules:
//! - Keyword entries are substring matches against the normalized message.
//! - Short single-word entries (alphabetic, three characters or fewer, like
//!   "hi" or "my") only match on word boundaries.
//! - A keyword starting or ending with `\b` is pinned to a word boundary on
//!   that side: `\blate\b` matches "late" but not "latest" or "calculate",
//!   `\brule` matches "rules" but not "schedule".
//! - Regex entries are compiled case-insensitive.

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest keyword that is matched on word boundaries instead of as a substring
const WHOLE_WORD_MAX_LEN: usize = 3;

/// Keyword prefix/suffix that pins the entry to a word boundary
const WORD_BOUNDARY: &str = "\\b";

/// Errors raised while loading or compiling pattern tables
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("failed to read pattern file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pattern tables: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid regex in table '{table}': {pattern}: {source}")]
    InvalidRegex {
        table: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern table '{table}' is empty")]
    EmptyTable { table: String },
}

/// A labelled keyword group; the first group with a hit decides the label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Maps keywords to the logical data sources they require
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRule {
    pub keywords: Vec<String>,
    pub tables: Vec<String>,
}

/// Raw, serializable pattern tables
///
/// Missing fields in a TOML file fall back to the built-in tables, so a
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTables {
    pub greetings: Vec<String>,
    pub request_indicators: Vec<String>,
    pub policy_keywords: Vec<String>,
    pub personal_data_indicators: Vec<String>,
    /// Regexes for requests that target someone else's data
    pub unauthorized_access: Vec<String>,
    /// Words captured as `name` by an unauthorized-access regex that are not
    /// people ("last year's leave")
    pub possessive_exclusions: Vec<String>,
    pub out_of_scope_keywords: Vec<String>,
    /// Regexes for arithmetic expressions ("2+2", "what's 7")
    pub arithmetic: Vec<String>,

    pub request_types: Vec<KeywordGroup>,
    pub policy_areas: Vec<KeywordGroup>,
    pub data_types: Vec<KeywordGroup>,
    pub required_tables: Vec<TableRule>,
    pub complexity_keywords: Vec<String>,
    pub sensitive_keywords: Vec<String>,
    pub out_of_scope_topics: Vec<KeywordGroup>,
}

static DEFAULT_TABLES: Lazy<PatternTables> = Lazy::new(PatternTables::builtin);

impl Default for PatternTables {
    fn default() -> Self {
        DEFAULT_TABLES.clone()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn group(label: &str, keywords: &[&str]) -> KeywordGroup {
    KeywordGroup {
        label: label.to_string(),
        keywords: words(keywords),
    }
}

fn rule(keywords: &[&str], tables: &[&str]) -> TableRule {
    TableRule {
        keywords: words(keywords),
        tables: words(tables),
    }
}

impl PatternTables {
    fn builtin() -> Self {
        Self {
            greetings: words(&[
                "hi",
                "hello",
                "hey",
                "good morning",
                "good afternoon",
                "good evening",
                "namaste",
                "greetings",
            ]),
            request_indicators: words(&[
                "help", "need", "want", "can you", "show me", "tell me", "check", "find",
            ]),
            policy_keywords: words(&[
                "policy",
                "policies",
                "procedure",
                "process",
                r"\brule",
                "how to",
                "what is the",
                "explain",
            ]),
            personal_data_indicators: words(&[
                "my",
                r"\bmine\b",
                "show me my",
                "what is my",
                "how many",
                "my own",
            ]),
            unauthorized_access: words(&[
                r"\bother employees?\b",
                r"\bcolleague'?s\b",
                r"\bteam members?\b",
                r"\beveryone'?s\b",
                r"\b(?P<name>[a-z]+)'s\s+(?:salary|leave|performance)\b",
            ]),
            possessive_exclusions: words(&[
                "today",
                "tonight",
                "yesterday",
                "tomorrow",
                "day",
                "week",
                "weekend",
                "month",
                "quarter",
                "year",
                "company",
                "organization",
                "organisation",
                "it",
                "that",
                "this",
                "what",
                "who",
                "here",
                "there",
                "let",
            ]),
            out_of_scope_keywords: words(&[
                "weather",
                "temperature",
                "forecast",
                "cricket",
                "football",
                "sports",
                "movie",
                "recipe",
                "who is",
                "who was",
                "capital of",
                "stock price",
                "bitcoin",
                "programming",
                "calculate",
            ]),
            arithmetic: words(&[r"\d+\s*[+\-*/]\s*\d+", r"\bwhat'?s\s+\d+"]),

            request_types: vec![
                group(
                    "leave_related",
                    &["leave", "vacation", "holiday", "time off", "absence"],
                ),
                group(
                    "attendance_related",
                    &["attendance", r"\bpresent\b", "absent", r"\blate\b", "check in", "check-in"],
                ),
                group("policy_related", &["policy", r"\brule", "procedure"]),
                group(
                    "performance_related",
                    &["performance", r"\breview", r"\brating", "appraisal", "feedback", "goal"],
                ),
            ],
            policy_areas: vec![
                group(
                    "leave_policies",
                    &["leave", "vacation", "holiday", "sick", "maternity", "paternity"],
                ),
                group(
                    "employment_policies",
                    &[
                        "probation",
                        "notice period",
                        "resignation",
                        "termination",
                        "employment",
                        "contract",
                        "onboarding",
                    ],
                ),
                group(
                    "compensation_policies",
                    &[
                        "salary",
                        "pay",
                        "payroll",
                        "bonus",
                        "compensation",
                        "benefit",
                        "reimbursement",
                        "increment",
                    ],
                ),
                group(
                    "workplace_policies",
                    &[
                        "remote",
                        "work from home",
                        "wfh",
                        "dress code",
                        "office",
                        "harassment",
                        "conduct",
                        "attendance",
                    ],
                ),
            ],
            data_types: vec![
                group("leave_balance", &["leave", "vacation", "holiday", "time off"]),
                group(
                    "attendance_record",
                    &[
                        "attendance",
                        "absent",
                        r"\bpresent\b",
                        r"\blate\b",
                        "check in",
                        "worked",
                        "working hours",
                    ],
                ),
                group(
                    "performance_data",
                    &["performance", r"\breview", r"\brating", "appraisal", "goal", "feedback"],
                ),
                group(
                    "profile_info",
                    &[
                        "profile",
                        "address",
                        "phone",
                        "email",
                        "department",
                        "designation",
                        "manager",
                        "joining date",
                    ],
                ),
                group(
                    "payroll_data",
                    &["salary", "payroll", "payslip", "pay", "bonus", "tax", "compensation"],
                ),
            ],
            required_tables: vec![
                rule(
                    &["leave", "vacation", "holiday", "time off"],
                    &["leave_balances", "leave_types"],
                ),
                rule(
                    &["leave request", "leave application", "applied", "pending", "approved"],
                    &["leave_requests"],
                ),
                rule(
                    &["attendance", "absent", r"\bpresent\b", r"\blate\b", "check in", "worked"],
                    &["attendance"],
                ),
                rule(
                    &["performance", r"\breview", r"\brating", "appraisal", "goal", "feedback"],
                    &["performance_reviews"],
                ),
                rule(
                    &["salary", "payroll", "payslip", "pay", "bonus", "tax"],
                    &["payroll"],
                ),
                rule(
                    &[
                        "profile",
                        "address",
                        "phone",
                        "email",
                        "department",
                        "designation",
                        "manager",
                    ],
                    &["employees"],
                ),
            ],
            complexity_keywords: words(&[
                "complete",
                "detailed",
                "all",
                "comprehensive",
                "entire",
                r"\bfull\b",
                "breakdown",
            ]),
            sensitive_keywords: words(&["salary", "payroll", "performance", "personal"]),
            out_of_scope_topics: vec![
                group("weather", &["weather", "temperature", r"\brain\b", "forecast", "sunny"]),
                group(
                    "sports",
                    &["cricket", "football", "sports", "match", "score", "ipl", "tennis"],
                ),
                group(
                    "mathematics",
                    &[
                        "calculate",
                        r"\bmath",
                        r"\bplus\b",
                        "minus",
                        "multiply",
                        r"\bdivide\b",
                        "sum of",
                    ],
                ),
                group(
                    "technology",
                    &["programming", "python", "javascript", "computer", "software", "bitcoin"],
                ),
            ],
        }
    }

    /// Parse tables from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, PatternError> {
        Ok(toml::from_str(content)?)
    }

    /// Load tables from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PatternError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PatternError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Lower-case a message and fold typographic apostrophes to ASCII
pub fn normalize(message: &str) -> String {
    message.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'")
}

#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    /// Must start at a word boundary
    left: bool,
    /// Must end at a word boundary
    right: bool,
}

impl Keyword {
    fn new(raw: &str) -> Option<Self> {
        let mut text = raw.trim().to_lowercase();
        let mut left = false;
        let mut right = false;
        if let Some(rest) = text.strip_prefix(WORD_BOUNDARY) {
            text = rest.to_string();
            left = true;
        }
        if let Some(rest) = text.strip_suffix(WORD_BOUNDARY) {
            text = rest.to_string();
            right = true;
        }
        if text.is_empty() {
            return None;
        }
        if text.len() <= WHOLE_WORD_MAX_LEN && text.chars().all(|c| c.is_ascii_alphabetic()) {
            left = true;
            right = true;
        }
        Some(Self { text, left, right })
    }

    fn found_in(&self, message: &str) -> bool {
        if !self.left && !self.right {
            return message.contains(&self.text);
        }
        message.match_indices(&self.text).any(|(start, _)| {
            let end = start + self.text.len();
            let before = message[..start].chars().next_back();
            let after = message[end..].chars().next();
            !(self.left && before.is_some_and(char::is_alphanumeric))
                && !(self.right && after.is_some_and(char::is_alphanumeric))
        })
    }
}

/// A compiled keyword list
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new(raw: &[String]) -> Self {
        Self {
            keywords: raw.iter().filter_map(|k| Keyword::new(k)).collect(),
        }
    }

    /// True if at least one keyword occurs in the normalized message
    pub fn contains_any(&self, message: &str) -> bool {
        self.first_match(message).is_some()
    }

    /// The first keyword (in table order) that occurs in the message
    pub fn first_match(&self, message: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| k.found_in(message))
            .map(|k| k.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// A compiled regex list
///
/// A match whose `name` capture group is an excluded word does not count.
#[derive(Debug, Clone, Default)]
pub struct RegexList {
    regexes: Vec<Regex>,
    excluded_names: HashSet<String>,
}

impl RegexList {
    pub fn compile(table: &'static str, raw: &[String]) -> Result<Self, PatternError> {
        let regexes = raw
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| PatternError::InvalidRegex {
                        table,
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            regexes,
            excluded_names: HashSet::new(),
        })
    }

    /// Ignore matches whose `name` group captured one of `names`
    pub fn excluding_names(mut self, names: &[String]) -> Self {
        self.excluded_names = names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        self
    }

    /// Matches that count, with their `name` capture if the regex has one
    fn accepted<'m>(&'m self, message: &'m str) -> impl Iterator<Item = Option<&'m str>> + 'm {
        self.regexes.iter().flat_map(move |re| {
            re.captures_iter(message).filter_map(move |caps| match caps.name("name") {
                Some(name) if self.excluded_names.contains(&name.as_str().to_lowercase()) => None,
                Some(name) => Some(Some(name.as_str())),
                None => Some(None),
            })
        })
    }

    /// True if at least one regex matches the normalized message
    pub fn matches_any(&self, message: &str) -> bool {
        self.accepted(message).next().is_some()
    }

    /// The first accepted `name` capture group found by any regex
    pub fn captured_name(&self, message: &str) -> Option<String> {
        self.accepted(message).flatten().next().map(str::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }
}

/// A compiled labelled keyword group
#[derive(Debug, Clone)]
pub struct LabelledSet {
    pub label: String,
    pub keywords: KeywordSet,
}

/// A compiled table rule
#[derive(Debug, Clone)]
pub struct CompiledTableRule {
    pub keywords: KeywordSet,
    pub tables: Vec<String>,
}

/// Validated, ready-to-match pattern tables
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub greetings: KeywordSet,
    pub request_indicators: KeywordSet,
    pub policy_keywords: KeywordSet,
    pub personal_data_indicators: KeywordSet,
    pub unauthorized_access: RegexList,
    pub out_of_scope_keywords: KeywordSet,
    pub arithmetic: RegexList,

    pub request_types: Vec<LabelledSet>,
    pub policy_areas: Vec<LabelledSet>,
    pub data_types: Vec<LabelledSet>,
    pub required_tables: Vec<CompiledTableRule>,
    pub complexity_keywords: KeywordSet,
    pub sensitive_keywords: KeywordSet,
    pub out_of_scope_topics: Vec<LabelledSet>,
}

fn labelled(groups: &[KeywordGroup]) -> Vec<LabelledSet> {
    groups
        .iter()
        .map(|g| LabelledSet {
            label: g.label.clone(),
            keywords: KeywordSet::new(&g.keywords),
        })
        .collect()
}

fn require_keywords(table: &str, set: &KeywordSet) -> Result<(), PatternError> {
    if set.is_empty() {
        return Err(PatternError::EmptyTable {
            table: table.to_string(),
        });
    }
    Ok(())
}

impl CompiledPatterns {
    /// Compile and validate raw tables. Any bad regex or empty core table
    /// rejects the whole set.
    pub fn compile(tables: &PatternTables) -> Result<Self, PatternError> {
        let compiled = Self {
            greetings: KeywordSet::new(&tables.greetings),
            request_indicators: KeywordSet::new(&tables.request_indicators),
            policy_keywords: KeywordSet::new(&tables.policy_keywords),
            personal_data_indicators: KeywordSet::new(&tables.personal_data_indicators),
            unauthorized_access: RegexList::compile(
                "unauthorized_access",
                &tables.unauthorized_access,
            )?
            .excluding_names(&tables.possessive_exclusions),
            out_of_scope_keywords: KeywordSet::new(&tables.out_of_scope_keywords),
            arithmetic: RegexList::compile("arithmetic", &tables.arithmetic)?,
            request_types: labelled(&tables.request_types),
            policy_areas: labelled(&tables.policy_areas),
            data_types: labelled(&tables.data_types),
            required_tables: tables
                .required_tables
                .iter()
                .map(|r| CompiledTableRule {
                    keywords: KeywordSet::new(&r.keywords),
                    tables: r
                        .tables
                        .iter()
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect(),
                })
                .collect(),
            complexity_keywords: KeywordSet::new(&tables.complexity_keywords),
            sensitive_keywords: KeywordSet::new(&tables.sensitive_keywords),
            out_of_scope_topics: labelled(&tables.out_of_scope_topics),
        };

        require_keywords("greetings", &compiled.greetings)?;
        require_keywords("request_indicators", &compiled.request_indicators)?;
        require_keywords("policy_keywords", &compiled.policy_keywords)?;
        require_keywords("personal_data_indicators", &compiled.personal_data_indicators)?;
        require_keywords("out_of_scope_keywords", &compiled.out_of_scope_keywords)?;
        if compiled.unauthorized_access.is_empty() {
            return Err(PatternError::EmptyTable {
                table: "unauthorized_access".to_string(),
            });
        }
        if let Some(index) = compiled
            .required_tables
            .iter()
            .position(|r| r.tables.is_empty())
        {
            return Err(PatternError::EmptyTable {
                table: format!("required_tables[{}].tables", index),
            });
        }

        Ok(compiled)
    }

    /// The built-in tables, compiled
    pub fn builtin() -> Result<Self, PatternError> {
        Self::compile(&PatternTables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(list: &[&str]) -> KeywordSet {
        KeywordSet::new(&words(list))
    }

    #[test]
    fn test_builtin_tables_compile() {
        assert!(CompiledPatterns::builtin().is_ok());
    }

    #[test]
    fn test_short_keywords_match_whole_words_only() {
        let greetings = set(&["hi", "hey"]);
        assert!(greetings.contains_any("hi, i need help"));
        assert!(greetings.contains_any("oh hey!"));
        assert!(!greetings.contains_any("who is sachin tendulkar?"));
        assert!(!greetings.contains_any("this is a test"));
    }

    #[test]
    fn test_long_keywords_match_substrings() {
        let policy = set(&["policy"]);
        assert!(policy.contains_any("what are the leave policies?"));
        assert!(!policy.contains_any("tell me a joke"));
    }

    #[test]
    fn test_first_match_follows_table_order() {
        let keywords = set(&["leave", "salary"]);
        assert_eq!(keywords.first_match("salary and leave"), Some("leave"));
        assert_eq!(keywords.first_match("nothing here"), None);
    }

    #[test]
    fn test_blank_keywords_are_dropped() {
        let keywords = set(&["", "   "]);
        assert!(keywords.is_empty());
        assert!(!keywords.contains_any("anything"));
    }

    #[test]
    fn test_boundary_marked_keywords() {
        let attendance = set(&[r"\blate\b", r"\bmine\b"]);
        assert!(attendance.contains_any("was i late yesterday"));
        assert!(attendance.contains_any("is this mine?"));
        assert!(!attendance.contains_any("show me my latest payslip"));
        assert!(!attendance.contains_any("calculate my related deductions"));
        assert!(!attendance.contains_any("can you determine the bonus amount"));
    }

    #[test]
    fn test_left_boundary_only_allows_suffixes() {
        let policy = set(&[r"\brule"]);
        assert!(policy.contains_any("what are the rules"));
        assert!(!policy.contains_any("my schedule"));
    }

    #[test]
    fn test_excluded_possessives_do_not_match() {
        let list = RegexList::compile(
            "unauthorized_access",
            &words(&[r"\b(?P<name>[a-z]+)'s\s+(?:salary|leave|performance)\b"]),
        )
        .unwrap()
        .excluding_names(&words(&["year", "month"]));
        assert!(!list.matches_any("what was my last year's performance rating?"));
        assert!(!list.matches_any("show me my last month's leave"));
        assert_eq!(list.captured_name("show me my last month's leave"), None);
        assert_eq!(
            list.captured_name("last year's leave and raj's salary").as_deref(),
            Some("raj")
        );
    }

    #[test]
    fn test_regex_list_captures_name() {
        let list = RegexList::compile(
            "unauthorized_access",
            &words(&[r"\b(?P<name>[a-z]+)'s\s+(?:salary|leave)\b"]),
        )
        .unwrap();
        assert!(list.matches_any("show me raj's salary details"));
        assert_eq!(
            list.captured_name("show me raj's salary details").as_deref(),
            Some("raj")
        );
        assert!(!list.matches_any("show me my salary"));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let tables = PatternTables {
            arithmetic: words(&[r"(\d+"]),
            ..Default::default()
        };
        match CompiledPatterns::compile(&tables) {
            Err(PatternError::InvalidRegex { table, .. }) => assert_eq!(table, "arithmetic"),
            other => panic!("Expected InvalidRegex, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_core_table_is_rejected() {
        let tables = PatternTables {
            greetings: Vec::new(),
            ..Default::default()
        };
        match CompiledPatterns::compile(&tables) {
            Err(PatternError::EmptyTable { table }) => assert_eq!(table, "greetings"),
            other => panic!("Expected EmptyTable, got {:?}", other),
        }
    }

    #[test]
    fn test_table_rule_without_tables_is_rejected() {
        let tables = PatternTables {
            required_tables: vec![rule(&["leave"], &[" "])],
            ..Default::default()
        };
        assert!(matches!(
            CompiledPatterns::compile(&tables),
            Err(PatternError::EmptyTable { .. })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let tables = PatternTables::from_toml_str(
            r#"
greetings = ["yo"]
"#,
        )
        .unwrap();
        assert_eq!(tables.greetings, vec!["yo".to_string()]);
        assert_eq!(tables.policy_keywords, PatternTables::default().policy_keywords);
    }

    #[test]
    fn test_load_missing_file() {
        match PatternTables::load("/nonexistent/hr-intent/patterns.toml") {
            Err(PatternError::Io { .. }) => {}
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_folds_curly_apostrophes() {
        assert_eq!(normalize("Raj\u{2019}s Salary"), "raj's salary");
    }
}
