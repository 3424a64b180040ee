//! End-to-end scenarios over the public API.
//!
//! Each test assembles a small dataset as JSON, the same shape `load_dataset`
//! reads from disk, and checks the ranked output of one computation.

use serde_json::{json, Value};

use lapboard::data::{Dataset, DatasetFile};
use lapboard::laps::{best_lap, LapFilter, LapScope};
use lapboard::scoring::{participation_status, score_competition, ParticipationStatus, ScoringConfig};
use lapboard::standings::{aggregate_championship, aggregate_league};

fn dataset(value: Value) -> Dataset {
    let file: DatasetFile = serde_json::from_value(value).unwrap();
    Dataset::new(file).unwrap()
}

fn driver(id: u32, name: &str, trust_level: u32) -> Value {
    json!({ "driver_id": id, "last_name": name, "trust_level": trust_level })
}

fn session(id: &str, code: &str, hour: u32, competition: Option<u32>) -> Value {
    json!({
        "session_id": id,
        "session_type": code,
        "track_name": "spa",
        "session_date": format!("2024-03-01T{:02}:00:00Z", hour),
        "competition_id": competition,
    })
}

fn competition(id: u32, championship: u32, round: u32) -> Value {
    json!({
        "competition_id": id,
        "name": format!("Round {}", round),
        "track_name": "spa",
        "championship_id": championship,
        "round_number": round,
        "is_completed": true,
    })
}

fn result(session: &str, driver: u32, position: Option<u32>) -> Value {
    json!({ "session_id": session, "driver_id": driver, "position": position })
}

fn lap(lap_id: u64, session: &str, driver: u32, ms: i64, valid: bool) -> Value {
    json!({
        "lap_id": lap_id,
        "session_id": session,
        "driver_id": driver,
        "lap_time": ms,
        "is_valid_for_best": valid,
    })
}

/// One championship where driver 1 scores a flat `points` per round through
/// a bonus adjustment on an unclassified race result.
fn flat_season(championship: u32, scores: &[u32]) -> (Vec<Value>, Vec<Value>, Vec<Value>, Vec<Value>) {
    let mut competitions = Vec::new();
    let mut sessions = Vec::new();
    let mut results = Vec::new();
    let mut adjustments = Vec::new();
    for (i, points) in scores.iter().enumerate() {
        let round = i as u32 + 1;
        let id = championship * 100 + round;
        let sid = format!("c{}r{}", championship, round);
        competitions.push(competition(id, championship, round));
        sessions.push(session(&sid, "R", round, Some(id)));
        results.push(result(&sid, 1, None));
        adjustments.push(json!({ "competition_id": id, "driver_id": 1, "bonus_points": points }));
    }
    (competitions, sessions, results, adjustments)
}

fn drop_one_of_four(scores: &[u32]) -> Dataset {
    let (competitions, sessions, results, adjustments) = flat_season(1, scores);
    dataset(json!({
        "drivers": [driver(1, "Alpha", 1)],
        "championships": [{
            "championship_id": 1,
            "name": "Spring Cup",
            "total_rounds": 4,
            "drop_worst_results": 1,
        }],
        "competitions": competitions,
        "sessions": sessions,
        "session_results": results,
        "adjustments": adjustments,
    }))
}

#[test]
fn test_worst_round_dropped_even_when_zero() {
    let data = drop_one_of_four(&[10, 0, 20, 5]);
    let standings = aggregate_championship(&data, 1, &ScoringConfig::default()).unwrap();

    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].gross_points, 35);
    assert_eq!(standings[0].points_dropped, 0);
    assert_eq!(standings[0].base_points, 35);
    assert_eq!(standings[0].counted_rounds, 3);
    assert_eq!(standings[0].dropped_rounds(), vec![Some(2)]);
}

#[test]
fn test_lowest_positive_round_dropped() {
    let data = drop_one_of_four(&[10, 8, 20, 5]);
    let standings = aggregate_championship(&data, 1, &ScoringConfig::default()).unwrap();

    assert_eq!(standings[0].points_dropped, 5);
    assert_eq!(standings[0].base_points, 38);
    assert_eq!(standings[0].total_points, 38.0);
}

#[test]
fn test_championship_is_idempotent() {
    let data = drop_one_of_four(&[10, 8, 20, 5]);
    let config = ScoringConfig::default();
    let first = aggregate_championship(&data, 1, &config).unwrap();
    let second = aggregate_championship(&data, 1, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_league_rewards_consistency_only_across_tiers() {
    // Driver 1 (X) races tier 1 only; driver 2 (Y) races both tiers.
    let data = dataset(json!({
        "drivers": [driver(1, "X", 1), driver(2, "Y", 1)],
        "leagues": [{ "league_id": 1, "name": "Winter League", "total_tiers": 2 }],
        "championships": [
            { "championship_id": 1, "name": "Tier 1", "total_rounds": 1, "league_id": 1, "tier_number": 1 },
            { "championship_id": 2, "name": "Tier 2", "total_rounds": 1, "league_id": 1, "tier_number": 2 },
        ],
        "competitions": [competition(101, 1, 1), competition(201, 2, 1)],
        "sessions": [session("t1", "R", 1, Some(101)), session("t2", "R", 2, Some(201))],
        "session_results": [result("t1", 1, None), result("t1", 2, None), result("t2", 2, None)],
        "adjustments": [
            { "competition_id": 101, "driver_id": 1, "bonus_points": 100 },
            { "competition_id": 101, "driver_id": 2, "bonus_points": 100 },
            { "competition_id": 201, "driver_id": 2, "bonus_points": 100 },
        ],
    }));
    let config = ScoringConfig::default();
    let standings = aggregate_league(&data, 1, &config).unwrap();

    let x = standings.iter().find(|s| s.driver_id == 1).unwrap();
    let y = standings.iter().find(|s| s.driver_id == 2).unwrap();
    assert_eq!(x.consistency_bonus, 0.0);
    assert_eq!(x.total_final_points, 100.0);
    assert_eq!(y.consistency_bonus, config.consistency.scale);
    assert_eq!(y.total_final_points, 200.0 + config.consistency.scale);
    assert_eq!(standings[0].driver_id, 2);
    assert_eq!(x.tiers[1].points, None);
}

#[test]
fn test_competition_ranks_classified_ahead_of_pointless() {
    let data = dataset(json!({
        "drivers": [driver(1, "A", 2), driver(2, "B", 1), driver(3, "C", 1), driver(4, "Guest", 0)],
        "championships": [{ "championship_id": 1, "name": "Cup", "total_rounds": 1 }],
        "competitions": [competition(101, 1, 1)],
        "sessions": [session("race", "R", 1, Some(101))],
        "session_results": [result("race", 1, Some(1)), result("race", 2, Some(2)), result("race", 3, Some(3))],
    }));
    let config = ScoringConfig {
        race_points: Some(vec![25, 18]),
        ..ScoringConfig::default()
    };
    let rows = score_competition(&data, 101, &config).unwrap();

    let order: Vec<u32> = rows.iter().map(|r| r.driver_id).collect();
    assert_eq!(order, vec![1, 2, 3]);
    assert_eq!(rows[0].total_points, 25);
    assert_eq!(rows[1].total_points, 18);
    assert_eq!(rows[2].total_points, 0);
    assert_eq!(rows[2].status, ParticipationStatus::Classified);
    assert_eq!(rows[0].wins, 1);
    assert_eq!(rows[2].podiums, 1);

    assert_eq!(
        participation_status(&data, 101, 4).unwrap(),
        ParticipationStatus::Absent
    );
}

#[test]
fn test_implausible_and_flagged_laps_never_win() {
    let data = dataset(json!({
        "drivers": [driver(1, "A", 1), driver(2, "B", 1)],
        "sessions": [session("p1", "FP1", 1, None)],
        "laps": [
            lap(1, "p1", 1, 25_000, true),
            lap(2, "p1", 1, 3_600_000, true),
            lap(3, "p1", 2, 85_000, false),
            lap(4, "p1", 2, 91_000, true),
            lap(5, "p1", 1, 90_500, true),
        ],
    }));
    let best = best_lap(&data, &LapScope::Session("p1".to_string()), &LapFilter::all_sessions())
        .unwrap()
        .unwrap();
    assert_eq!(best.lap_id, 5);
    assert_eq!(best.lap_time, 90_500);
}

#[test]
fn test_equal_laps_go_to_earlier_session_then_lower_driver() {
    let data = dataset(json!({
        "drivers": [driver(1, "A", 1), driver(2, "B", 1), driver(3, "C", 1)],
        "sessions": [session("early", "FP1", 1, None), session("late", "FP2", 2, None)],
        "laps": [
            lap(10, "late", 1, 90_000, true),
            lap(11, "early", 3, 90_000, true),
            lap(12, "early", 2, 90_000, true),
        ],
    }));
    let best = best_lap(&data, &LapScope::Track("spa".to_string()), &LapFilter::all_sessions())
        .unwrap()
        .unwrap();
    assert_eq!(best.session_id, "early");
    assert_eq!(best.driver_id, 2);
}

#[test]
fn test_empty_scope_is_no_data() {
    let data = dataset(json!({ "drivers": [driver(1, "A", 1)] }));
    let best = best_lap(&data, &LapScope::Track("monza".to_string()), &LapFilter::all_sessions()).unwrap();
    assert!(best.is_none());
}
