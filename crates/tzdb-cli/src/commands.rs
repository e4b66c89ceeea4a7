use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tzdb_diff::{
    diff_databases, diff_transitions, render_rules, DatabaseDiff, DiffLine, RuleLookup,
    TransitionDiff,
};
use tzdb_store::{StoreConfig, TimeZoneDatabase, ZoneRulesProvider};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = StoreConfig {
        data_file_name: cli.data_file,
    };
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(&args, &config, cli.format)?,
        Command::Info(args) => cmd_info(&args, &config, cli.format)?,
        Command::Show(args) => cmd_show(&args, &config, cli.format)?,
    };
    print!("{output}");
    Ok(())
}

fn load_database(path: &Path, config: &StoreConfig) -> anyhow::Result<TimeZoneDatabase> {
    TimeZoneDatabase::open_with(path, config)
        .with_context(|| format!("failed to load time-zone database from {}", path.display()))
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DiffReport<'a> {
    left_version: &'a str,
    right_version: &'a str,
    #[serde(flatten)]
    diff: &'a DatabaseDiff,
    transitions: BTreeMap<&'a str, TransitionDiff>,
}

fn cmd_diff(args: &DiffArgs, config: &StoreConfig, format: OutputFormat) -> anyhow::Result<String> {
    let left = load_database(&args.left, config)?;
    let right = load_database(&args.right, config)?;
    let diff = diff_databases(&left, &right);

    let transitions = diff
        .rules
        .different
        .iter()
        .filter_map(|delta| {
            let (l, r) = (delta.left.rules()?, delta.right.rules()?);
            Some((delta.zone_id.as_str(), diff_transitions(l, r)))
        })
        .collect();
    let report = DiffReport {
        left_version: left.version_id(),
        right_version: right.version_id(),
        diff: &diff,
        transitions,
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)? + "\n"),
        OutputFormat::Text => render_diff_text(&report),
    }
}

fn render_diff_text(report: &DiffReport<'_>) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "Left version:  {}", report.left_version.cyan())?;
    writeln!(out, "Right version: {}", report.right_version.cyan())?;
    writeln!(out)?;

    let ids = &report.diff.zone_ids;
    if ids.is_identical() {
        writeln!(out, "{} zone ids are identical", "✓".green())?;
    } else {
        for (side, extra) in [("left", &ids.extra_in_left), ("right", &ids.extra_in_right)] {
            writeln!(out, "Zone ids only in {side} ({}):", extra.len())?;
            for id in extra {
                writeln!(out, "  {}", id.yellow())?;
            }
        }
    }
    writeln!(out)?;

    let rules = &report.diff.rules;
    if rules.is_identical() {
        writeln!(out, "{} rules are identical ({} zones compared)", "✓".green(), rules.len())?;
        return Ok(out);
    }
    writeln!(
        out,
        "Rules differ for {} of {} zones:",
        rules.different.len(),
        rules.len()
    )?;
    for delta in &rules.different {
        writeln!(out)?;
        writeln!(out, "{}", delta.zone_id.bold())?;
        write_lookup(&mut out, "left", &delta.left)?;
        write_lookup(&mut out, "right", &delta.right)?;
        if let Some(lines) = report.transitions.get(delta.zone_id.as_str()) {
            write_line_diff(&mut out, lines)?;
        }
    }
    Ok(out)
}

fn write_lookup(out: &mut String, side: &str, lookup: &RuleLookup) -> anyhow::Result<()> {
    match lookup {
        RuleLookup::Found(rules) => {
            writeln!(out, "  {side}:")?;
            for line in render_rules(rules) {
                writeln!(out, "    {line}")?;
            }
        }
        RuleLookup::Missing => writeln!(out, "  {side}: {}", "(no rules)".dimmed())?,
        RuleLookup::Failed(err) => writeln!(out, "  {side}: {}", err.to_string().red())?,
    }
    Ok(())
}

fn write_line_diff(out: &mut String, diff: &TransitionDiff) -> anyhow::Result<()> {
    for hunk in &diff.hunks {
        let header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.left_start, hunk.left_count, hunk.right_start, hunk.right_count
        );
        writeln!(out, "  {}", header.cyan())?;
        for line in &hunk.lines {
            match line {
                DiffLine::Context(text) => writeln!(out, "   {text}")?,
                DiffLine::Removed(text) => writeln!(out, "  {}", format!("-{text}").red())?,
                DiffLine::Added(text) => writeln!(out, "  {}", format!("+{text}").green())?,
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// info / show
// ---------------------------------------------------------------------------

fn cmd_info(args: &InfoArgs, config: &StoreConfig, format: OutputFormat) -> anyhow::Result<String> {
    let db = load_database(&args.path, config)?;
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "version": db.version_id(),
                "zones": db.zone_ids().len(),
                "linked_zones": db.linked_count(),
                "blobs": db.blob_count(),
            });
            Ok(serde_json::to_string_pretty(&summary)? + "\n")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Version:  {}", db.version_id().cyan())?;
            writeln!(out, "Zones:    {}", db.zone_ids().len())?;
            writeln!(out, "Linked:   {}", db.linked_count())?;
            writeln!(out, "Blobs:    {}", db.blob_count())?;
            Ok(out)
        }
    }
}

fn cmd_show(args: &ShowArgs, config: &StoreConfig, format: OutputFormat) -> anyhow::Result<String> {
    let db = load_database(&args.path, config)?;
    let rules = db
        .require_rules(&args.zone)
        .with_context(|| format!("no rules for {} in {db}", args.zone))?;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "zone": args.zone,
                "version": db.version_id(),
                "rules": &*rules,
            });
            Ok(serde_json::to_string_pretty(&value)? + "\n")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            writeln!(out, "{} ({db})", args.zone.bold())?;
            writeln!(out, "{rules}")?;
            let transitions = rules.transitions();
            writeln!(out, "Transitions ({}):", transitions.len())?;
            for t in &transitions {
                writeln!(out, "  {t}")?;
            }
            let recurring = rules.transition_rules();
            writeln!(out, "Recurring rules ({}):", recurring.len())?;
            for rule in recurring {
                writeln!(out, "  {rule}")?;
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tzdb_store::TzdbWriter;
    use tzdb_types::{AbsoluteTransition, RuleSet, UtcOffset};

    fn off(hours: i32) -> UtcOffset {
        UtcOffset::from_hours_minutes(hours, 0).unwrap()
    }

    fn zone_y(epoch: i64) -> RuleSet {
        RuleSet::from_transitions(
            off(0),
            off(0),
            &[],
            &[AbsoluteTransition::new(epoch, off(0), off(1))],
            vec![],
        )
        .unwrap()
    }

    fn write_db(dir: &Path, name: &str, version: &str, epoch: i64, extra: Option<&str>) -> PathBuf {
        let mut w = TzdbWriter::new(version);
        w.add_zone("Etc/UTC", &RuleSet::fixed(UtcOffset::UTC));
        w.add_zone("Zone/Y", &zone_y(epoch));
        if let Some(id) = extra {
            w.add_zone(id, &RuleSet::fixed(off(5)));
        }
        let path = dir.join(name);
        w.finish(&path).unwrap();
        path
    }

    fn config() -> StoreConfig {
        StoreConfig::default()
    }

    #[test]
    fn diff_json_reports_both_deltas() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_db(dir.path(), "a.dat", "2024a", 0, Some("Zone/X"));
        let right = write_db(dir.path(), "b.dat", "2024b", 3600, None);

        let args = DiffArgs { left, right };
        let out = cmd_diff(&args, &config(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["left_version"], "2024a");
        assert_eq!(json["right_version"], "2024b");
        assert_eq!(json["zone_ids"]["extra_in_left"][0], "Zone/X");
        assert_eq!(json["rules"]["equal"][0], "Etc/UTC");
        assert_eq!(json["rules"]["different"][0]["zone_id"], "Zone/Y");
        assert!(json["transitions"]["Zone/Y"]["hunks"].is_array());
    }

    #[test]
    fn diff_text_identical() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_db(dir.path(), "a.dat", "2024a", 0, None);
        let args = DiffArgs {
            left: left.clone(),
            right: left,
        };
        let out = cmd_diff(&args, &config(), OutputFormat::Text).unwrap();
        assert!(out.contains("zone ids are identical"));
        assert!(out.contains("rules are identical (2 zones compared)"));
    }

    #[test]
    fn diff_text_lists_differing_zone() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_db(dir.path(), "a.dat", "2024a", 0, None);
        let right = write_db(dir.path(), "b.dat", "2024b", 3600, None);
        let args = DiffArgs { left, right };
        let out = cmd_diff(&args, &config(), OutputFormat::Text).unwrap();
        assert!(out.contains("Rules differ for 1 of 2 zones:"));
        assert!(out.contains("Zone/Y"));
        assert!(out.contains("@@ -1,1 +1,1 @@"));
    }

    #[test]
    fn diff_reports_decode_failure_and_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_db(dir.path(), "a.dat", "2024a", 0, None);
        let mut w = TzdbWriter::new("2024b");
        w.add_zone("Etc/UTC", &RuleSet::fixed(UtcOffset::UTC));
        w.add_raw_zone("Zone/Y", vec![9]);
        let right = dir.path().join("b.dat");
        w.finish(&right).unwrap();

        let args = DiffArgs { left, right };
        let out = cmd_diff(&args, &config(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let failed = json["rules"]["different"][0]["right"]["failed"].as_str().unwrap();
        assert!(failed.contains("unknown serialized type: 9"));
    }

    #[test]
    fn diff_load_failure_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let left = write_db(dir.path(), "a.dat", "2024a", 0, None);
        let right = dir.path().join("bad.dat");
        std::fs::write(&right, [2u8, 0, 4, b'T', b'Z', b'D', b'B']).unwrap();

        let args = DiffArgs { left, right };
        let err = cmd_diff(&args, &config(), OutputFormat::Text).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("bad.dat"));
        assert!(message.contains("format version 2"));
    }

    #[test]
    fn info_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_db(dir.path(), "tzdb.dat", "2024a", 0, Some("Zone/X"));
        let args = InfoArgs {
            path: dir.path().to_path_buf(),
        };
        let out = cmd_info(&args, &config(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["version"], "2024a");
        assert_eq!(json["zones"], 3);
        assert_eq!(json["blobs"], 3);
    }

    #[test]
    fn show_zone_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_db(dir.path(), "a.dat", "2024a", 0, None);
        let args = ShowArgs {
            path,
            zone: "Zone/Y".into(),
        };
        let out = cmd_show(&args, &config(), OutputFormat::Json).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["zone"], "Zone/Y");
        assert_eq!(json["rules"]["savings_instant_transitions"][0], 0);
    }

    #[test]
    fn show_unknown_zone_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_db(dir.path(), "a.dat", "2024a", 0, None);
        let args = ShowArgs {
            path,
            zone: "Mars/Base".into(),
        };
        let err = cmd_show(&args, &config(), OutputFormat::Text).unwrap_err();
        assert!(format!("{err:#}").contains("unknown time-zone id: Mars/Base"));
    }
}
