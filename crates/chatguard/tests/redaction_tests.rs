//! Integration tests for detection and redaction.

use chatguard::category::{BuiltinCategory, Category};
use chatguard::pii::{Entity, MatchSource, PatternDetector, RedactionPlan, might_contain_pii, redact};
use chatguard::settings::Settings;

#[test]
fn scenario_national_id() {
    assert_eq!(redact("my id is 123456789012", &Settings::default(), &[]), "my id is [ИИН]");
}

#[test]
fn scenario_email() {
    assert_eq!(redact("contact a@b.com", &Settings::default(), &[]), "contact [EMAIL]");
}

#[test]
fn scenario_phone() {
    assert_eq!(redact("call +79991234567", &Settings::default(), &[]), "call [ТЕЛЕФОН]");
    assert_eq!(redact("call 89991234567", &Settings::default(), &[]), "call [ТЕЛЕФОН]");
}

#[test]
fn scenario_person_entity() {
    let entities = [Entity::new("John Smith", "PERSON")];
    assert_eq!(
        redact("John Smith called", &Settings::default(), &entities),
        "[PERSON] called"
    );
}

#[test]
fn passport_card_and_birthdate() {
    let settings = Settings::default();
    assert_eq!(redact("passport 123456789", &settings, &[]), "passport [ПАСПОРТ]");
    assert_eq!(redact("card 4111111111111111", &settings, &[]), "card [КАРТА]");
    assert_eq!(redact("born 01.02.1990", &settings, &[]), "born [ДАТА РОЖДЕНИЯ]");
    assert_eq!(redact("born 01/02/1990", &settings, &[]), "born [ДАТА РОЖДЕНИЯ]");
}

#[test]
fn mixed_birthdate_separators_are_not_dates() {
    let settings = Settings::default();
    assert_eq!(redact("born 01.02-1990", &settings, &[]), "born 01.02-1990");
    // The gate is looser than the rule.
    assert!(might_contain_pii("born 01.02-1990"));
}

#[test]
fn address() {
    assert_eq!(
        redact("живу ул. Абая, д. 10, кв. 5 рядом", &Settings::default(), &[]),
        "живу [ADDRESS] рядом"
    );
}

#[test]
fn digit_runs_of_the_wrong_length_are_left_alone() {
    let settings = Settings::default();
    assert_eq!(redact("code 1234567890", &settings, &[]), "code 1234567890");
    assert_eq!(redact("code 12345678901234567", &settings, &[]), "code 12345678901234567");
}

#[test]
fn mixed_message() {
    let entities = [Entity::new("Айгерим Серикова", "PERSON"), Entity::new("ТОО \"Ромашка\"", "ORG")];
    let text = "Айгерим Серикова из ТОО \"Ромашка\", ИИН 990101300123, почта a.s@mail.kz";
    assert_eq!(
        redact(text, &Settings::default(), &entities),
        "[PERSON] из [ORG], ИИН [ИИН], почта [EMAIL]"
    );
}

#[test]
fn classifier_builtin_label_uses_builtin_toggle() {
    let entities = [Entity::new("secret@corp", "EMAIL")];
    let on = redact("mail secret@corp", &Settings::default(), &entities);
    assert_eq!(on, "mail [EMAIL]");

    let off = Settings::default().with(BuiltinCategory::Email, false);
    assert_eq!(redact("mail secret@corp", &off, &entities), "mail secret@corp");
}

#[test]
fn plan_order() {
    let settings = Settings::default().with(BuiltinCategory::Passport, false);
    let plan = RedactionPlan::build(
        &settings,
        &[Entity::new("Bob", "PERSON"), Entity::new("Acme", "ORG")],
    );
    let order: Vec<String> = plan.rules().iter().map(|r| r.category().key().to_string()).collect();
    assert_eq!(
        order,
        ["ИИН", "EMAIL", "ТЕЛЕФОН", "КАРТА", "ДАТА РОЖДЕНИЯ", "ADDRESS", "PERSON", "ORG"]
    );
    assert_eq!(plan.rules()[6].replacement(), "[PERSON]");
}

#[test]
fn detector_reports_pattern_matches() {
    let matches = PatternDetector.detect("a@b.com and c@d.org", &Settings::default());
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.source == MatchSource::Pattern));
    assert!(matches.iter().all(|m| m.category == Category::BuiltIn(BuiltinCategory::Email)));
    assert_eq!(matches[1].text, "c@d.org");
}

#[test]
fn overlap_is_resolved_by_order() {
    let settings = Settings::default();
    assert_eq!(
        PatternDetector.matching_categories("8800555353512345", &settings),
        vec![BuiltinCategory::Phone, BuiltinCategory::CardNumber]
    );
    assert_eq!(redact("8800555353512345", &settings, &[]), "[ТЕЛЕФОН]12345");
}
