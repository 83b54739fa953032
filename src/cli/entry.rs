use anyhow::{bail, Result};
use chrono_tz::Tz;
use clap::Parser;

use crate::{
    report::calendar::today_in_zone,
    store::{
        entities::{ActualUpdate, DailyEntryEntity, GoalUpdate},
        entry_store::EntryStore,
        roster::FsRosterStore,
    },
    utils::clock::{Clock, DefaultClock},
};

use super::{parse_cli_date, DateStyle};

#[derive(Debug, Parser)]
pub struct GoalsCommand {
    #[arg(long, help = "Rep the entry belongs to")]
    rep: String,
    #[arg(
        long,
        help = "Date of the entry. Examples are \"today\", \"yesterday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Dials to make")]
    dials: Option<u32>,
    #[arg(long, help = "New prospects to add")]
    prospects: Option<u32>,
    #[arg(long, help = "New business sets to book")]
    sets_new_biz: Option<u32>,
    #[arg(long, help = "Expansion sets to book")]
    sets_expansion: Option<u32>,
    #[arg(long, help = "Combined sets goal kept for old sheets")]
    sets_total: Option<u32>,
    #[arg(long, help = "Sales qualified opportunities to open")]
    sqos: Option<u32>,
    #[arg(long, help = "Focus for the day")]
    focus: Option<String>,
}

/// Saves the goal half of a standup entry. The whole goal section is
/// replaced, so leaving a flag off clears that field.
pub async fn process_goals_command(
    GoalsCommand {
        rep,
        date,
        date_style,
        dials,
        prospects,
        sets_new_biz,
        sets_expansion,
        sets_total,
        sqos,
        focus,
    }: GoalsCommand,
    roster: &FsRosterStore,
    store: &impl EntryStore,
    zone: Tz,
) -> Result<()> {
    let Some(rep) = roster.find(&rep).await? else {
        bail!("no rep named {rep} in the roster");
    };

    let clock = DefaultClock;
    let date = match date {
        Some(value) => parse_cli_date(&value, date_style, &clock, zone)?,
        None => today_in_zone(clock.now(), zone),
    };

    let mut entry = store
        .entry_for(rep.id, date)
        .await?
        .unwrap_or_else(|| DailyEntryEntity::new(rep.id, date));
    entry.apply_goals(GoalUpdate {
        dials,
        prospects,
        sets_new_biz,
        sets_expansion,
        sets_total,
        sqos,
        focus_text: focus,
    });
    store.upsert_entry(entry).await?;

    println!("Saved goals for {} on {date}", rep.name);
    Ok(())
}

#[derive(Debug, Parser)]
pub struct ActualsCommand {
    #[arg(long, help = "Rep the entry belongs to")]
    rep: String,
    #[arg(
        long,
        help = "Date of the entry. Examples are \"today\", \"yesterday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Dials made")]
    dials: Option<u32>,
    #[arg(long, help = "New prospects added")]
    prospects: Option<u32>,
    #[arg(long, help = "New business sets booked")]
    sets_new_biz: Option<u32>,
    #[arg(long, help = "Expansion sets booked")]
    sets_expansion: Option<u32>,
    #[arg(long, help = "Sales qualified opportunities opened")]
    sqos: Option<u32>,
    #[arg(long, help = "What went well")]
    wins: Option<String>,
    #[arg(long, help = "What got in the way")]
    blockers: Option<String>,
    #[arg(long, help = "Anything else worth keeping")]
    notes: Option<String>,
}

/// Saves the end-of-day half of a standup entry, same replacement semantics
/// as [process_goals_command].
pub async fn process_actuals_command(
    ActualsCommand {
        rep,
        date,
        date_style,
        dials,
        prospects,
        sets_new_biz,
        sets_expansion,
        sqos,
        wins,
        blockers,
        notes,
    }: ActualsCommand,
    roster: &FsRosterStore,
    store: &impl EntryStore,
    zone: Tz,
) -> Result<()> {
    let Some(rep) = roster.find(&rep).await? else {
        bail!("no rep named {rep} in the roster");
    };

    let clock = DefaultClock;
    let date = match date {
        Some(value) => parse_cli_date(&value, date_style, &clock, zone)?,
        None => today_in_zone(clock.now(), zone),
    };

    let mut entry = store
        .entry_for(rep.id, date)
        .await?
        .unwrap_or_else(|| DailyEntryEntity::new(rep.id, date));
    entry.apply_actuals(ActualUpdate {
        dials,
        prospects,
        sets_new_biz,
        sets_expansion,
        sqos,
        wins,
        blockers,
        notes,
    });
    store.upsert_entry(entry).await?;

    println!("Saved actuals for {} on {date}", rep.name);
    Ok(())
}
