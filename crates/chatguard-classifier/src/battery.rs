//! The ordered pattern battery behind `/analyze`.

use std::collections::HashSet;
use std::sync::LazyLock;

use chatguard::category::BuiltinCategory;
use chatguard::pii::{Entity, pattern};
use regex::Regex;

/// Two capitalized Cyrillic words, optionally with a patronymic-style ending.
static PERSON_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[А-Я][а-я]+ [А-Я][а-я]+(?:ов|ев|ин|ова|ева|ина|кызы|улы)?")
        .expect("person pattern is a valid regex")
});

/// A legal form followed by a quoted name.
static ORG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:TOO|ТОО|АО|ИП)\s+["'][\wА-Яа-я\s\-]+["']"#).expect("org pattern is a valid regex")
});

/// Label reported for a built-in category.
///
/// Addresses go out as `АДРЕС`, which clients do not configure by default.
const fn builtin_label(category: BuiltinCategory) -> &'static str {
    match category {
        BuiltinCategory::Address => "АДРЕС",
        other => other.key(),
    }
}

fn rules() -> impl Iterator<Item = (&'static str, &'static Regex)> {
    BuiltinCategory::ALL
        .into_iter()
        .map(|c| (builtin_label(c), pattern(c)))
        .chain([
            ("PERSON", &*PERSON_PATTERN),
            ("ORG", &*ORG_PATTERN),
        ])
}

/// Labels this service can report, in battery order.
#[must_use]
pub fn labels() -> impl Iterator<Item = &'static str> {
    rules().map(|(label, _)| label)
}

/// Run every rule over `text`.
///
/// Results follow battery order, then position. A `(text, label)` pair is
/// reported once, at its first occurrence.
#[must_use]
pub fn extract(text: &str) -> Vec<Entity> {
    let mut seen = HashSet::new();
    rules()
        .flat_map(|(label, re)| re.find_iter(text).map(move |m| Entity::new(m.as_str(), label)))
        .filter(|e| seen.insert((e.text.clone(), e.label.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        extract(text).into_iter().map(|e| (e.text, e.label)).collect()
    }

    #[test]
    fn battery_order() {
        let labels: Vec<_> = labels().collect();
        assert_eq!(
            labels,
            ["ИИН", "EMAIL", "ТЕЛЕФОН", "ПАСПОРТ", "КАРТА", "ДАТА РОЖДЕНИЯ", "АДРЕС", "PERSON", "ORG"]
        );
    }

    #[test]
    fn person_and_org() {
        assert_eq!(
            pairs(r#"Иван Петров работает в ТОО "Ромашка""#),
            vec![
                ("Иван Петров".to_string(), "PERSON".to_string()),
                (r#"ТОО "Ромашка""#.to_string(), "ORG".to_string()),
            ]
        );
    }

    #[test]
    fn latin_names_are_not_persons() {
        assert!(pairs("John Smith called").is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(pairs("a@b.com, again a@b.com").len(), 1);
    }

    #[test]
    fn same_text_different_labels_both_reported() {
        // The phone rule fires inside the card number as well.
        let found = pairs("8800555353512345");
        assert_eq!(found[0].1, "ТЕЛЕФОН");
        assert_eq!(found[1], ("8800555353512345".to_string(), "КАРТА".to_string()));
    }

    #[test]
    fn address_label() {
        let found = pairs("ул. Абая, д. 10");
        assert_eq!(found, vec![("ул. Абая, д. 10".to_string(), "АДРЕС".to_string())]);
    }
}
