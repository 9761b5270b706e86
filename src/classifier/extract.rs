//! Attribute extractors
//!
//! Each extractor is total and independent: it reads the normalized message
//! and the pattern tables and always returns a value.

use crate::patterns::{CompiledPatterns, LabelledSet};

pub const GENERAL_HR: &str = "general_hr";
pub const GENERAL_POLICIES: &str = "general_policies";
pub const GENERAL_DATA: &str = "general_data";
pub const GENERAL_KNOWLEDGE: &str = "general_knowledge";
pub const MATHEMATICS: &str = "mathematics";
pub const FALLBACK_TABLE: &str = "employees";

fn first_label<'a>(groups: &'a [LabelledSet], message: &str) -> Option<&'a str> {
    groups
        .iter()
        .find(|g| g.keywords.contains_any(message))
        .map(|g| g.label.as_str())
}

/// leave_related, attendance_related, policy_related, performance_related or general_hr
pub fn request_type<'a>(patterns: &'a CompiledPatterns, message: &str) -> &'a str {
    first_label(&patterns.request_types, message).unwrap_or(GENERAL_HR)
}

/// leave, employment, compensation, workplace or general policies
pub fn policy_area<'a>(patterns: &'a CompiledPatterns, message: &str) -> &'a str {
    first_label(&patterns.policy_areas, message).unwrap_or(GENERAL_POLICIES)
}

/// Kind of personal record being asked for
pub fn data_type<'a>(patterns: &'a CompiledPatterns, message: &str) -> &'a str {
    first_label(&patterns.data_types, message).unwrap_or(GENERAL_DATA)
}

/// Logical data sources the request needs, in rule order without duplicates.
/// Never empty.
pub fn required_tables(patterns: &CompiledPatterns, message: &str) -> Vec<String> {
    let mut tables: Vec<String> = Vec::new();
    for rule in &patterns.required_tables {
        if !rule.keywords.contains_any(message) {
            continue;
        }
        for table in &rule.tables {
            if !tables.contains(table) {
                tables.push(table.clone());
            }
        }
    }
    if tables.is_empty() {
        tables.push(FALLBACK_TABLE.to_string());
    }
    tables
}

pub fn complexity(patterns: &CompiledPatterns, message: &str) -> &'static str {
    if patterns.complexity_keywords.contains_any(message) {
        "detailed"
    } else {
        "simple"
    }
}

pub fn security_level(patterns: &CompiledPatterns, message: &str) -> &'static str {
    if patterns.sensitive_keywords.contains_any(message) {
        "sensitive"
    } else {
        "basic"
    }
}

/// Topic of a non-HR question. Arithmetic always counts as mathematics.
pub fn out_of_scope_category<'a>(patterns: &'a CompiledPatterns, message: &str) -> &'a str {
    if patterns.arithmetic.matches_any(message) {
        return MATHEMATICS;
    }
    first_label(&patterns.out_of_scope_topics, message).unwrap_or(GENERAL_KNOWLEDGE)
}

/// Whose data an unauthorized request names, when a pattern captures it
pub fn target(patterns: &CompiledPatterns, message: &str) -> Option<String> {
    patterns.unauthorized_access.captured_name(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> CompiledPatterns {
        CompiledPatterns::builtin().unwrap()
    }

    #[test]
    fn test_request_type() {
        let p = patterns();
        assert_eq!(request_type(&p, "i need help with my leave balance"), "leave_related");
        assert_eq!(request_type(&p, "can you check my attendance"), "attendance_related");
        assert_eq!(request_type(&p, "i want my appraisal feedback"), "performance_related");
        assert_eq!(request_type(&p, "can you help me"), GENERAL_HR);
    }

    #[test]
    fn test_policy_area() {
        let p = patterns();
        assert_eq!(policy_area(&p, "what is the vacation policy"), "leave_policies");
        assert_eq!(policy_area(&p, "explain the notice period rule"), "employment_policies");
        assert_eq!(policy_area(&p, "bonus policy"), "compensation_policies");
        assert_eq!(policy_area(&p, "work from home procedure"), "workplace_policies");
        assert_eq!(policy_area(&p, "what is the policy"), GENERAL_POLICIES);
    }

    #[test]
    fn test_data_type() {
        let p = patterns();
        assert_eq!(data_type(&p, "how many days was i absent"), "attendance_record");
        assert_eq!(data_type(&p, "my leave balance"), "leave_balance");
        assert_eq!(data_type(&p, "my payslip"), "payroll_data");
        assert_eq!(data_type(&p, "my department"), "profile_info");
        assert_eq!(data_type(&p, "my stuff"), GENERAL_DATA);
    }

    #[test]
    fn test_required_tables_ordered_unique() {
        let p = patterns();
        assert_eq!(
            required_tables(&p, "my leave and vacation and salary"),
            vec!["leave_balances", "leave_types", "payroll"]
        );
    }

    #[test]
    fn test_required_tables_never_empty() {
        let p = patterns();
        assert_eq!(required_tables(&p, "my stuff"), vec![FALLBACK_TABLE]);
    }

    #[test]
    fn test_complexity_and_security() {
        let p = patterns();
        assert_eq!(complexity(&p, "show me my complete history"), "detailed");
        assert_eq!(complexity(&p, "show me my history"), "simple");
        assert_eq!(complexity(&p, "is that small"), "simple");
        assert_eq!(security_level(&p, "my salary"), "sensitive");
        assert_eq!(security_level(&p, "my leave"), "basic");
    }

    #[test]
    fn test_out_of_scope_category() {
        let p = patterns();
        assert_eq!(out_of_scope_category(&p, "what's 2+2?"), MATHEMATICS);
        assert_eq!(out_of_scope_category(&p, "weather today"), "weather");
        assert_eq!(out_of_scope_category(&p, "who won the cricket match"), "sports");
        assert_eq!(out_of_scope_category(&p, "teach me python programming"), "technology");
        assert_eq!(out_of_scope_category(&p, "who is sachin tendulkar?"), GENERAL_KNOWLEDGE);
    }

    #[test]
    fn test_target_name() {
        let p = patterns();
        assert_eq!(target(&p, "show me raj's salary details").as_deref(), Some("raj"));
        assert_eq!(target(&p, "show me other employees data"), None);
    }
}
