use chrono::{NaiveDate, NaiveDateTime};
use rules::services::{automatic_progression, requested_weight};
use rules::{
    AttemptNo, ClockReading, CoefficientTable, CompetitionRules, EngineError, EntryId, EntryMeta,
    Field, Gender, Proposal, RuleViolation, ScoringEngine, ScoringSystem, Session, SessionId,
    SinclairEdition, ValidationMode,
};
use rust_decimal::Decimal;

fn at(second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 20)
        .unwrap()
        .and_hms_opt(14, 0, second)
        .unwrap()
}

fn athlete(name: &str, start_number: u32) -> EntryMeta {
    let mut meta = EntryMeta::new(name, Gender::M);
    meta.start_number = start_number;
    meta.lot_number = start_number;
    meta
}

fn write(
    session: &mut Session,
    entry: EntryId,
    attempt: AttemptNo,
    field: Field,
    value: i32,
    second: u32,
) -> Result<(), EngineError> {
    session.submit_at(
        entry,
        &Proposal::new(attempt, field, Some(value)),
        ValidationMode::Enforced,
        &ClockReading::idle(),
        at(second),
    )
}

fn violation(result: Result<(), EngineError>) -> RuleViolation {
    match result {
        Err(EngineError::Rule(violation)) => violation,
        other => panic!("expected a rule violation, got {other:?}"),
    }
}

#[test]
fn test_lower_start_number_cannot_follow_at_same_weight() {
    let mut session = Session::new(SessionId::new("M81-A"), CompetitionRules::default());
    let a = session.add_entry(athlete("A", 1));
    let b = session.add_entry(athlete("B", 2));

    write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 98, 0).unwrap();
    write(&mut session, b, AttemptNo::SNATCH_1, Field::Declaration, 100, 1).unwrap();

    session.clock_started(b, 100, AttemptNo::SNATCH_1).unwrap();
    write(&mut session, b, AttemptNo::SNATCH_1, Field::ActualLift, 100, 10).unwrap();
    session.set_timing_checks(true);

    let err = violation(write(&mut session, a, AttemptNo::SNATCH_1, Field::Change1, 100, 20));
    match err {
        RuleViolation::StartNumberTooHigh {
            start_number,
            reference,
            ..
        } => {
            assert_eq!(start_number, 1);
            assert_eq!(reference.entry, b);
            assert_eq!(reference.start_number, 2);
        }
        other => panic!("unexpected violation {other:?}"),
    }

    write(&mut session, a, AttemptNo::SNATCH_1, Field::Change1, 101, 21).unwrap();
}

#[test]
fn test_heavier_lift_blocks_lighter_change() {
    let mut session = Session::new(SessionId::new("M81-A"), CompetitionRules::default());
    let a = session.add_entry(athlete("A", 1));
    let b = session.add_entry(athlete("B", 2));

    write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 100, 0).unwrap();
    write(&mut session, b, AttemptNo::SNATCH_1, Field::Declaration, 102, 1).unwrap();
    session.clock_started(b, 102, AttemptNo::SNATCH_1).unwrap();
    write(&mut session, b, AttemptNo::SNATCH_1, Field::ActualLift, 102, 10).unwrap();

    let err = violation(write(&mut session, a, AttemptNo::SNATCH_1, Field::Change1, 101, 20));
    assert!(matches!(err, RuleViolation::WeightBelowAlreadyLifted { requested: 101, .. }));
    write(&mut session, a, AttemptNo::SNATCH_1, Field::Change1, 103, 21).unwrap();
}

#[test]
fn test_declaration_against_automatic_progression() {
    let mut session = Session::new(SessionId::new("W64"), CompetitionRules::default());
    let a = session.add_entry(athlete("A", 1));

    write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 100, 0).unwrap();
    write(&mut session, a, AttemptNo::SNATCH_1, Field::ActualLift, 100, 1).unwrap();

    let err = violation(write(&mut session, a, AttemptNo::SNATCH_2, Field::Declaration, 100, 2));
    assert!(matches!(
        err,
        RuleViolation::DeclarationValueTooSmall {
            requested: 100,
            automatic: 101,
            ..
        }
    ));
    write(&mut session, a, AttemptNo::SNATCH_2, Field::Declaration, 102, 3).unwrap();
}

#[test]
fn test_starting_total_boundary() {
    for (qualifying_total, accepted) in [(120, true), (121, false)] {
        let mut session = Session::new(SessionId::new("Youth"), CompetitionRules::default());
        let mut meta = athlete("A", 1);
        meta.qualifying_total = qualifying_total;
        let a = session.add_entry(meta);

        write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 50, 0).unwrap();
        let result = write(&mut session, a, AttemptNo::CLEAN_JERK_1, Field::Declaration, 50, 1);
        if accepted {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                violation(result),
                RuleViolation::Rule15_20Violated { margin: 20, .. }
            ));
        }
    }
}

#[test]
fn test_sinclair_2020_reference_value() {
    let mut session = Session::new(SessionId::new("M81"), CompetitionRules::default());
    let mut meta = athlete("A", 1);
    meta.body_weight = Some(Decimal::new(813, 1));
    let a = session.add_entry(meta);
    write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 80, 0).unwrap();
    write(&mut session, a, AttemptNo::SNATCH_1, Field::ActualLift, 80, 1).unwrap();
    write(&mut session, a, AttemptNo::CLEAN_JERK_1, Field::Declaration, 100, 2).unwrap();
    write(&mut session, a, AttemptNo::CLEAN_JERK_1, Field::ActualLift, 100, 3).unwrap();

    let table = CoefficientTable::bundled().unwrap();
    let engine = ScoringEngine::new(&table, SinclairEdition::Y2020).unwrap();
    let entry = session.entry(a).unwrap();
    assert_eq!(entry.card.total(), 180);
    let score = engine.compute_score(&entry.meta, &entry.card, ScoringSystem::Sinclair);
    assert!((score - 218.4038).abs() < 1e-3, "sinclair was {score}");
}

#[test]
fn test_withdraw_from_snatch_leaves_clean_jerk() {
    let mut session = Session::new(SessionId::new("M81"), CompetitionRules::default());
    let a = session.add_entry(athlete("A", 1));
    write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 90, 0).unwrap();
    write(&mut session, a, AttemptNo::SNATCH_1, Field::ActualLift, -90, 1).unwrap();
    write(&mut session, a, AttemptNo::CLEAN_JERK_1, Field::Declaration, 115, 2).unwrap();

    assert_eq!(session.withdraw_from_snatch(a).unwrap(), 2);

    let card = &session.entry(a).unwrap().card;
    for attempt in [AttemptNo::SNATCH_2, AttemptNo::SNATCH_3] {
        assert_eq!(card.actual_lift(attempt), Some(0));
        assert_eq!(card.slot(attempt).lift_time, None);
    }
    assert_eq!(card.actual_lift(AttemptNo::SNATCH_1), Some(-90));
    assert_eq!(card.slot(AttemptNo::CLEAN_JERK_1).declaration, Some(115));
    assert_eq!(card.actual_lift(AttemptNo::CLEAN_JERK_1), None);
    assert_eq!(card.next_attempt(), Some(AttemptNo::CLEAN_JERK_1));
}

#[test]
fn test_accepted_values_follow_progression_and_match_request() {
    let mut session = Session::new(SessionId::new("W59"), CompetitionRules::default());
    let a = session.add_entry(athlete("A", 1));
    let plan = [(80, 80), (83, -83), (83, 83)];

    for (i, (attempt, (request, lifted))) in AttemptNo::all().zip(plan).enumerate() {
        let second = i as u32 * 10;
        write(&mut session, a, attempt, Field::Declaration, request, second).unwrap();

        let card = &session.entry(a).unwrap().card;
        let automatic = automatic_progression(card, attempt).unwrap_or(0);
        assert!(request >= automatic);

        let wrong = violation(write(
            &mut session,
            a,
            attempt,
            Field::ActualLift,
            request + 1,
            second + 1,
        ));
        assert!(matches!(wrong, RuleViolation::LiftValueNotWhatWasRequested { .. }));

        write(&mut session, a, attempt, Field::ActualLift, lifted, second + 2).unwrap();
        let card = &session.entry(a).unwrap().card;
        assert_eq!(card.actual_lift(attempt).map(i32::abs), Some(requested_weight(card, attempt)));
    }

    let card = &session.entry(a).unwrap().card;
    assert_eq!(card.best_snatch(), 83);
    assert_eq!(card.next_attempt(), Some(AttemptNo::CLEAN_JERK_1));
}

#[test]
fn test_recorded_result_survives_later_writes() {
    let mut session = Session::new(SessionId::new("M73"), CompetitionRules::default());
    let a = session.add_entry(athlete("A", 1));
    write(&mut session, a, AttemptNo::SNATCH_1, Field::Declaration, 100, 0).unwrap();
    write(&mut session, a, AttemptNo::SNATCH_1, Field::ActualLift, 100, 1).unwrap();

    for (field, value) in [
        (Field::ActualLift, None),
        (Field::Change1, Some(0)),
        (Field::Change1, Some(130)),
    ] {
        let result = session.submit_at(
            a,
            &Proposal::new(AttemptNo::SNATCH_1, field, value),
            ValidationMode::Enforced,
            &ClockReading::idle(),
            at(2),
        );
        assert!(matches!(
            violation(result),
            RuleViolation::ActualLiftAlreadyRecorded { recorded: 100, .. }
        ));
    }

    let card = &session.entry(a).unwrap().card;
    assert_eq!(card.actual_lift(AttemptNo::SNATCH_1), Some(100));
    assert_eq!(card.slot(AttemptNo::SNATCH_1).change1, None);
    assert_eq!(card.slot(AttemptNo::SNATCH_1).lift_time, Some(at(1)));
    assert_eq!(card.best_snatch(), 100);
}
