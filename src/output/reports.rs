//! Table layouts for every report the CLI prints.
use super::formatter::{
    format_date, format_gap, format_lap_time, format_optional, format_points, Column, Table,
};
use crate::laps::BestLap;
use crate::records::{
    DriverProfile, LeaderboardEntry, PersonalBest, SessionStatistics, TrackRecord, TrackStatistics,
};
use crate::scoring::{DriverCompetitionResult, ParticipationStatus};
use crate::standings::{DriverChampionshipStanding, DriverLeagueStanding};
use crate::time_attack::TimeAttackEntry;

fn key_values(pairs: Vec<(&str, String)>) -> Table {
    let mut table = Table::new(vec![Column::left("Field"), Column::flex("Value")], "No data.");
    for (key, value) in pairs {
        table.push(vec![key.to_string(), value]);
    }
    table
}

pub fn competition_table(rows: &[DriverCompetitionResult]) -> Table {
    let mut table = Table::new(
        vec![
            Column::right("Pos"),
            Column::flex("Driver"),
            Column::right("Q"),
            Column::right("R"),
            Column::right("Race"),
            Column::right("Pole"),
            Column::right("FL"),
            Column::right("Adj"),
            Column::right("Total"),
            Column::right("G+"),
            Column::right("G-"),
        ],
        "No participants.",
    );
    for row in rows {
        let race = match (row.status, row.race_points) {
            (_, Some(points)) => points.to_string(),
            (ParticipationStatus::Unclassified, None) => "NC".to_string(),
            _ => "-".to_string(),
        };
        let name = if row.is_guest() {
            format!("{} (guest)", row.driver_name)
        } else {
            row.driver_name.clone()
        };
        table.push(vec![
            row.position.to_string(),
            name,
            format_optional(row.qualifying_position),
            format_optional(row.race_position),
            race,
            row.pole_points.to_string(),
            row.fastest_lap_points.to_string(),
            row.points_bonus.to_string(),
            row.total_points.to_string(),
            format_optional(row.guests_beaten),
            format_optional(row.beaten_by_guests),
        ]);
    }
    table
}

pub fn championship_table(rows: &[DriverChampionshipStanding]) -> Table {
    let mut table = Table::new(
        vec![
            Column::right("Pos"),
            Column::flex("Driver"),
            Column::right("Rnd"),
            Column::right("W"),
            Column::right("Pod"),
            Column::right("Pole"),
            Column::right("FL"),
            Column::right("Gross"),
            Column::right("Drop"),
            Column::right("Base"),
            Column::right("Pen"),
            Column::right("Total"),
            Column::right("Avg"),
        ],
        "No standings.",
    );
    for row in rows {
        table.push(vec![
            row.position.to_string(),
            row.driver_name.clone(),
            row.competitions_participated.to_string(),
            row.wins.to_string(),
            row.podiums.to_string(),
            row.poles.to_string(),
            row.fastest_laps.to_string(),
            row.gross_points.to_string(),
            row.points_dropped.to_string(),
            row.base_points.to_string(),
            row.manual_penalties.to_string(),
            format_points(row.total_points),
            format_optional(row.average_position.map(format_points)),
        ]);
    }
    table
}

pub fn league_table(rows: &[DriverLeagueStanding]) -> Table {
    let mut columns = vec![Column::right("Pos"), Column::flex("Driver")];
    if let Some(first) = rows.first() {
        for tier in &first.tiers {
            columns.push(Column::right(format!("T{}", tier.tier_number)));
        }
    }
    columns.extend([
        Column::right("Tiers"),
        Column::right("Bonus"),
        Column::right("Total"),
        Column::right("W"),
    ]);

    let mut table = Table::new(columns, "No standings.");
    for row in rows {
        let mut cells = vec![row.position.to_string(), row.driver_name.clone()];
        cells.extend(row.tiers.iter().map(|t| format_optional(t.points.map(format_points))));
        cells.extend([
            row.tiers_participated.to_string(),
            format_points(row.consistency_bonus),
            format_points(row.total_final_points),
            row.total_wins.to_string(),
        ]);
        table.push(cells);
    }
    table
}

pub fn time_attack_table(entries: &[TimeAttackEntry]) -> Table {
    let mut table = Table::new(
        vec![
            Column::right("Pos"),
            Column::flex("Driver"),
            Column::right("Time"),
            Column::right("S1"),
            Column::right("S2"),
            Column::right("S3"),
            Column::right("Int"),
            Column::right("Gap"),
            Column::right("Avg"),
            Column::right("Pts"),
        ],
        "No time attack laps.",
    );
    for e in entries {
        let split = |i: usize| {
            e.splits
                .map(|s| format!("{}.{:03}", s[i] / 1_000, s[i] % 1_000))
                .unwrap_or_else(|| "-".to_string())
        };
        table.push(vec![
            e.position.to_string(),
            e.driver_name.clone(),
            format_lap_time(Some(e.lap_time)),
            split(0),
            split(1),
            split(2),
            e.gap_to_previous.map(format_gap).unwrap_or_else(|| "-".to_string()),
            format_gap(e.gap_to_leader),
            format_gap(e.deviation_from_average),
            e.points.to_string(),
        ]);
    }
    match entries.first() {
        Some(e) if e.finalized => table.with_footer("Final: points are frozen"),
        Some(_) => table.with_footer("Live: points may still change"),
        None => table,
    }
}

pub fn best_lap_table(lap: Option<&BestLap>) -> Table {
    match lap {
        Some(lap) => key_values(vec![
            ("Track", lap.track_name.clone()),
            ("Driver", lap.driver_name.clone()),
            ("Time", format_lap_time(Some(lap.lap_time))),
            ("Session", format!("{} ({})", lap.session_id, lap.session_type)),
            ("Date", format_date(lap.session_date)),
        ]),
        None => key_values(vec![]),
    }
}

pub fn track_records_table(records: &[TrackRecord]) -> Table {
    let mut table = Table::new(
        vec![
            Column::left("Track"),
            Column::flex("Holder"),
            Column::right("Time"),
            Column::left("Date"),
        ],
        "No records.",
    );
    for record in records {
        table.push(vec![
            record.lap.track_name.clone(),
            record.lap.driver_name.clone(),
            format_lap_time(Some(record.lap.lap_time)),
            format_date(record.lap.session_date),
        ]);
    }
    table
}

pub fn leaderboard_table(entries: &[LeaderboardEntry]) -> Table {
    let mut table = Table::new(
        vec![
            Column::right("Pos"),
            Column::flex("Driver"),
            Column::right("Time"),
            Column::right("Gap"),
            Column::left("Session"),
            Column::left("Date"),
        ],
        "No laps on this track.",
    );
    for e in entries {
        table.push(vec![
            e.position.to_string(),
            e.driver_name.clone(),
            format_lap_time(Some(e.lap_time)),
            format_gap(e.gap_to_leader),
            e.session_type.clone(),
            format_date(e.session_date),
        ]);
    }
    table
}

pub fn track_stats_table(stats: Option<&TrackStatistics>) -> Table {
    let Some(stats) = stats else {
        return key_values(vec![]);
    };
    key_values(vec![
        ("Track", stats.track_name.clone()),
        ("Sessions", stats.sessions.to_string()),
        ("Official sessions", stats.official_sessions.to_string()),
        ("Drivers", stats.unique_drivers.to_string()),
        ("Laps", stats.total_laps.to_string()),
        ("Valid laps", stats.valid_laps.to_string()),
        ("Best lap", format_lap_time(stats.best_lap)),
        ("Average lap", format_lap_time(stats.average_valid_lap)),
        (
            "Record",
            stats
                .record
                .as_ref()
                .map(|r| format!("{} by {}", format_lap_time(Some(r.lap.lap_time)), r.lap.driver_name))
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Last session", format_optional(stats.last_session.map(format_date))),
    ])
}

pub fn driver_bests_table(bests: &[PersonalBest]) -> Table {
    let mut table = Table::new(
        vec![
            Column::flex("Track"),
            Column::right("Time"),
            Column::right("Valid"),
            Column::left("Rec"),
            Column::left("Session"),
            Column::left("Date"),
        ],
        "No valid laps.",
    );
    for pb in bests {
        table.push(vec![
            pb.track_name.clone(),
            format_lap_time(Some(pb.lap_time)),
            pb.valid_laps.to_string(),
            if pb.is_record { "*".to_string() } else { String::new() },
            pb.session_type.clone(),
            format_date(pb.session_date),
        ]);
    }
    table
}

pub fn driver_profile_table(profile: &DriverProfile) -> Table {
    key_values(vec![
        ("Driver", profile.driver_name.clone()),
        ("Short name", format_optional(profile.short_name.as_deref())),
        ("Trust level", profile.trust_level.to_string()),
        ("Reports", profile.bad_driver_reports.to_string()),
        ("Sessions", profile.total_sessions.to_string()),
        ("Official sessions", profile.official_sessions.to_string()),
        ("Tracks", profile.tracks_driven.to_string()),
        ("Laps", profile.total_laps.to_string()),
        ("Records", profile.records_held.to_string()),
        ("Championships", profile.championships_entered.to_string()),
        ("Titles", profile.titles.to_string()),
        ("Wins", profile.wins.to_string()),
        ("Podiums", profile.podiums.to_string()),
        ("Poles", profile.poles.to_string()),
    ])
}

pub fn session_stats_table(stats: &SessionStatistics) -> Table {
    let track = match stats.most_used_track {
        Some(ref track) => format!("{} ({})", track, stats.most_used_track_sessions),
        None => "-".to_string(),
    };
    key_values(vec![
        ("From", format_date(stats.from)),
        ("To", format_date(stats.to)),
        ("Sessions", stats.total_sessions.to_string()),
        ("Official", stats.official_sessions.to_string()),
        ("Unofficial", stats.unofficial_sessions.to_string()),
        ("Drivers", stats.unique_drivers.to_string()),
        ("Busiest track", track),
        (
            "Last session",
            match (&stats.last_session_id, stats.last_session_date) {
                (Some(id), Some(date)) => format!("{} ({})", id, format_date(date)),
                _ => "-".to_string(),
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::DatasetBuilder;
    use crate::output::render_table;
    use crate::scoring::{score_competition, ScoringConfig};

    #[test]
    fn test_competition_table_marks_unclassified_and_guests() {
        let data = DatasetBuilder::new()
            .member(1, "Alpha")
            .guest(2, "Visitor")
            .competition(10, "monza", None, Some(1))
            .session("r", "R", "monza", 0, Some(10))
            .result("r", 1, None)
            .result("r", 2, Some(1))
            .build();
        let rows = score_competition(&data, 10, &ScoringConfig::default()).unwrap();
        let table = competition_table(&rows);
        assert_eq!(table.rows[0][1], "Visitor (guest)");
        assert_eq!(table.rows[0][9], "-");
        assert_eq!(table.rows[1][4], "NC");
        assert_eq!(table.rows[1][10], "1");
    }

    #[test]
    fn test_empty_reports_render_messages() {
        assert_eq!(render_table(&competition_table(&[]), false), "No participants.");
        assert_eq!(render_table(&best_lap_table(None), false), "No data.");
        assert_eq!(render_table(&track_stats_table(None), false), "No data.");
    }

    #[test]
    fn test_empty_time_attack_has_no_footer() {
        assert!(time_attack_table(&[]).footer.is_none());
    }
}
