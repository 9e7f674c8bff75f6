// Table layouts for every emitted report. Column order is fixed.

use crate::movement::MovementReport;
use crate::player::RankedEntry;
use crate::ranking::delta::DeltaRow;
use crate::report::tsv::{fixed2, fixed3, optional, TsvTable};
use crate::valuation::merge::CombinedScoreRow;
use crate::valuation::zscore::{ScoredBatter, ScoredPitcher};

pub fn adjusted_ranking_table(entries: &[RankedEntry]) -> TsvTable {
    let mut table = TsvTable::new(["PlayerID", "PLAYER NAME", "TEAM", "POS", "RK", "OFFSET", "ADJ RK"]);
    for e in entries {
        table.push_row(vec![
            optional(e.identity),
            e.name.clone(),
            optional(e.team.as_deref()),
            optional(e.position.as_deref()),
            e.rank.to_string(),
            e.offset.to_string(),
            e.adjusted_rank.to_string(),
        ]);
    }
    table
}

pub fn batter_zscore_table(rows: &[ScoredBatter]) -> TsvTable {
    let mut table = TsvTable::new([
        "PlayerID", "Name", "PA", "R", "HR", "RBI", "SB", "AVG", "Z_R", "Z_HR", "Z_RBI", "Z_SB", "Z_AVG", "TotalZ",
    ]);
    for row in rows {
        let (p, z) = (&row.projection, &row.zscores);
        table.push_row(vec![
            optional(p.identity),
            p.name.clone(),
            p.pa.to_string(),
            p.r.to_string(),
            p.hr.to_string(),
            p.rbi.to_string(),
            p.sb.to_string(),
            fixed3(p.avg),
            fixed2(z.r),
            fixed2(z.hr),
            fixed2(z.rbi),
            fixed2(z.sb),
            fixed2(z.avg),
            fixed2(z.total),
        ]);
    }
    table
}

pub fn pitcher_zscore_table(rows: &[ScoredPitcher]) -> TsvTable {
    let mut table = TsvTable::new([
        "PlayerID", "Name", "IP", "W", "K", "SV", "ERA", "WHIP", "Z_W", "Z_K", "Z_SV", "Z_ERA", "Z_WHIP", "TotalZ",
    ]);
    for row in rows {
        let (p, z) = (&row.projection, &row.zscores);
        table.push_row(vec![
            optional(p.identity),
            p.name.clone(),
            format!("{:.1}", p.ip),
            p.w.to_string(),
            p.k.to_string(),
            p.sv.to_string(),
            fixed2(p.era),
            fixed3(p.whip),
            fixed2(z.w),
            fixed2(z.k),
            fixed2(z.sv),
            fixed2(z.era),
            fixed2(z.whip),
            fixed2(z.total),
        ]);
    }
    table
}

/// Slot headers name the batter and pitcher category sharing each column.
pub fn combined_table(rows: &[CombinedScoreRow]) -> TsvTable {
    let mut table = TsvTable::new([
        "PlayerID", "Name", "Pos", "ZR_ZW", "ZHR_ZSV", "ZRBI_ZK", "ZSB_ZERA", "ZAVG_ZWHIP", "TotalZ",
    ]);
    for row in rows {
        let mut cells = vec![row.identity.to_string(), row.name.clone(), row.role.tag().to_string()];
        cells.extend(row.slots.iter().map(|z| fixed2(*z)));
        cells.push(fixed2(row.total_z));
        table.push_row(cells);
    }
    table
}

/// Non-zero movements only, in starting order.
pub fn movement_table(report: &MovementReport) -> TsvTable {
    let mut table = TsvTable::new(["PlayerName", "Movement"]);
    for record in report.non_zero() {
        table.push_row(vec![record.name.clone(), record.movement.to_string()]);
    }
    table
}

pub fn delta_table(rows: &[DeltaRow]) -> TsvTable {
    let mut table = TsvTable::new(["PlayerID", "PLAYER NAME", "TEAM", "POS", "PREVIOUS", "CURRENT", "MOVE"]);
    for row in rows {
        table.push_row(vec![
            optional(row.identity),
            row.name.clone(),
            optional(row.team.as_deref()),
            optional(row.position.as_deref()),
            row.previous_rank.to_string(),
            row.current_rank.to_string(),
            row.movement().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Role;

    #[test]
    fn ranking_row_layout() {
        let mut entry = RankedEntry::new("Cal Raleigh", 40)
            .with_identity(9)
            .with_team("SEA")
            .with_position("C1")
            .with_offset(12);
        entry.adjusted_rank = 31;
        let table = adjusted_ranking_table(&[entry, RankedEntry::new("Unknown", 41)]);
        assert_eq!(table.rows[0], vec!["9", "Cal Raleigh", "SEA", "C1", "40", "12", "31"]);
        assert_eq!(table.rows[1], vec!["", "Unknown", "", "", "41", "0", "0"]);
    }

    #[test]
    fn combined_row_layout() {
        let row = CombinedScoreRow {
            identity: 3,
            name: "Emmanuel Clase".into(),
            role: Role::Pitcher,
            slots: [0.1, 2.346, -0.5, 1.0, 0.0],
            total_z: 2.946,
        };
        let table = combined_table(&[row]);
        assert_eq!(table.headers.len(), 9);
        assert_eq!(
            table.rows[0],
            vec!["3", "Emmanuel Clase", "P", "0.10", "2.35", "-0.50", "1.00", "0.00", "2.95"]
        );
    }

    #[test]
    fn delta_row_layout() {
        let row = DeltaRow {
            identity: Some(4),
            name: "Jackson Chourio".into(),
            team: Some("MIL".into()),
            position: Some("LF".into()),
            previous_rank: 30,
            current_rank: 18,
        };
        let table = delta_table(&[row]);
        assert_eq!(table.rows[0], vec!["4", "Jackson Chourio", "MIL", "LF", "30", "18", "12"]);
    }
}
