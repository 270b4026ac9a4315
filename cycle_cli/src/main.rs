use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use cycle_core::trends::recent_series;
use cycle_core::*;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "ebb")]
#[command(about = "Personal menstrual cycle tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Evaluate as of this date instead of the current date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current phase, statistics and tips (default)
    Status,

    /// Log the first day of a period
    Start {
        /// Date of the event (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Log the last day of a period
    End {
        /// Date of the event (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a logged period event
    Delete {
        /// Event id as shown by `entries`
        id: Uuid,
    },

    /// List logged period events
    Entries {
        /// Only show events on this date
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record mood, energy and symptoms for a day
    Log {
        /// Date of the log (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Mood from 1 (very low) to 5 (great)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: Option<u8>,

        /// Energy from 1 (very low) to 5 (very high)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        energy: Option<u8>,

        /// Symptom tag (repeatable)
        #[arg(long = "symptom")]
        symptoms: Vec<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a month calendar with period, fertile and ovulation days
    Calendar {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
    },

    /// Show mood, energy and symptom trends
    Trends,

    /// Export events and daily logs as CSV
    Export {
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    cycle_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    // The only place the wall clock is read
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    tracing::debug!("Using data dir {:?}, today {}", data_dir, today);
    let mut store = FileStore::new(data_dir);

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => cmd_status(&store, today, &config),
        Commands::Start { date, notes } => {
            cmd_log_event(&mut store, EventKind::PeriodStart, date.unwrap_or(today), notes)
        }
        Commands::End { date, notes } => {
            cmd_log_event(&mut store, EventKind::PeriodEnd, date.unwrap_or(today), notes)
        }
        Commands::Delete { id } => cmd_delete(&mut store, id),
        Commands::Entries { date } => cmd_entries(&store, date),
        Commands::Log {
            date,
            mood,
            energy,
            symptoms,
            notes,
        } => cmd_log_day(
            &mut store,
            date.unwrap_or(today),
            mood,
            energy,
            symptoms,
            notes,
        ),
        Commands::Calendar { month } => {
            let month = month.unwrap_or_else(|| first_of_month(today));
            cmd_calendar(&store, month, &config)
        }
        Commands::Trends => cmd_trends(&store, today, &config),
        Commands::Export { out } => cmd_export(&store, out),
    }
}

fn cmd_status(store: &FileStore, today: NaiveDate, config: &Config) -> Result<()> {
    let events = store.load_events()?;
    let stats = calculate_cycle_statistics_with(&events, &config.prediction);
    let phase = current_phase_with(&events, &stats, today, &config.prediction);
    let tips = phase_tips(phase.phase);

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", tips.title);
    println!("╰─────────────────────────────────────────╯");
    println!("  {}", phase.insight());
    println!();

    println!(
        "  Cycle length:     {}",
        stats
            .average_cycle_length
            .map(|d| format!("{} days", d))
            .unwrap_or_else(|| "—".into())
    );
    println!(
        "  Period duration:  {}",
        stats
            .average_period_duration
            .map(|d| format!("{} days", d))
            .unwrap_or_else(|| "—".into())
    );
    println!(
        "  Next period:      {}",
        format_date(stats.predicted_next_period, "%b %-d, %Y")
    );
    println!(
        "  Ovulation:        {}",
        format_date(stats.predicted_ovulation, "%b %-d")
    );
    if let (Some(start), Some(end)) = (stats.fertile_window_start, stats.fertile_window_end) {
        println!(
            "  Fertile window:   {} – {}",
            start.format("%b %-d"),
            end.format("%b %-d")
        );
    }

    println!();
    println!("  Tips for today");
    for tip in &tips.tips {
        println!("  • {}", tip);
    }
    println!();

    Ok(())
}

fn cmd_log_event(
    store: &mut FileStore,
    kind: EventKind,
    date: NaiveDate,
    notes: Option<String>,
) -> Result<()> {
    let notes = notes.filter(|n| !n.trim().is_empty());
    let event = CycleEvent::new(date, kind, notes);
    store.insert_event(&event)?;

    let label = match kind {
        EventKind::PeriodStart => "period start",
        EventKind::PeriodEnd => "period end",
    };
    println!("✓ Logged {} on {}", label, date);
    println!("  id: {}", event.id);
    Ok(())
}

fn cmd_delete(store: &mut FileStore, id: Uuid) -> Result<()> {
    if store.delete_event(id)? {
        println!("✓ Deleted entry {}", id);
        Ok(())
    } else {
        Err(Error::Store(format!("No entry with id {}", id)))
    }
}

fn cmd_entries(store: &FileStore, date: Option<NaiveDate>) -> Result<()> {
    let events = store.load_events()?;
    let shown: Vec<&CycleEvent> = match date {
        Some(date) => events_for_date(&events, date),
        None => events.iter().collect(),
    };

    if shown.is_empty() {
        println!("No entries logged.");
        return Ok(());
    }

    for event in shown {
        let notes = event.notes.as_deref().unwrap_or("");
        println!(
            "{}  {:<12}  {}  {}",
            event.date,
            event.kind.as_str(),
            event.id,
            notes
        );
    }
    Ok(())
}

fn cmd_log_day(
    store: &mut FileStore,
    date: NaiveDate,
    mood: Option<u8>,
    energy: Option<u8>,
    symptoms: Vec<String>,
    notes: Option<String>,
) -> Result<()> {
    // Merge into an existing log for the same date
    let mut log = store
        .load_daily_logs()?
        .into_iter()
        .find(|l| l.date == date)
        .unwrap_or_else(|| DailyLog::new(date));

    if mood.is_some() {
        log.mood = mood;
    }
    if energy.is_some() {
        log.energy = energy;
    }
    if let Some(notes) = notes {
        log.notes = Some(notes).filter(|n| !n.trim().is_empty());
    }
    for symptom in symptoms.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !cycle_core::tips::is_common_symptom(symptom) {
            tracing::warn!("'{}' is not a common symptom tag; logging it anyway", symptom);
        }
        log.add_symptom(symptom);
    }

    store.upsert_daily_log(&log)?;

    println!("✓ Saved log for {}", date);
    if let Some(mood) = log.mood {
        println!("  Mood:     {} ({})", mood, mood_label(f64::from(mood)));
    }
    if let Some(energy) = log.energy {
        println!("  Energy:   {} ({})", energy, energy_label(f64::from(energy)));
    }
    if !log.symptoms.is_empty() {
        println!("  Symptoms: {}", log.symptoms.join(", "));
    }
    Ok(())
}

fn cmd_calendar(store: &FileStore, month: NaiveDate, config: &Config) -> Result<()> {
    let events = store.load_events()?;
    let stats = calculate_cycle_statistics_with(&events, &config.prediction);

    let next_month = if month.month() == 12 {
        NaiveDate::from_ymd_opt(month.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month.year(), month.month() + 1, 1)
    }
    .ok_or_else(|| Error::Other(format!("Month out of range: {}", month)))?;

    println!("\n  {}", month.format("%B %Y"));
    println!("  Sun Mon Tue Wed Thu Fri Sat");

    let mut line = String::from("  ");
    for _ in 0..month.weekday().num_days_from_sunday() {
        line.push_str("    ");
    }

    let mut day = month;
    while day < next_month {
        let status = day_status(&events, &stats, day);
        // Period overrides ovulation, which overrides fertile
        let marker = if status.is_period {
            'P'
        } else if status.is_ovulation {
            'O'
        } else if status.is_fertile {
            'F'
        } else {
            ' '
        };
        line.push_str(&format!("{:>2}{} ", day.day(), marker));

        if day.weekday().num_days_from_sunday() == 6 {
            println!("{}", line.trim_end());
            line = String::from("  ");
        }
        day += Duration::days(1);
    }
    if !line.trim().is_empty() {
        println!("{}", line.trim_end());
    }

    println!();
    println!("  P = period   O = ovulation   F = fertile window");
    println!();
    Ok(())
}

fn cmd_trends(store: &FileStore, today: NaiveDate, config: &Config) -> Result<()> {
    let logs = store.load_daily_logs()?;
    if logs.is_empty() {
        println!("Start logging your mood and symptoms to see trends over time.");
        return Ok(());
    }

    let summary = summarize_trends_with(&logs, today, &config.trends);

    println!("\n  Mood & Symptom Trends");
    println!();
    match summary.avg_mood_7d {
        Some(avg) => println!("  Avg mood (7 days):    {:.1} ({})", avg, mood_label(avg)),
        None => println!("  Avg mood (7 days):    No data"),
    }
    match summary.avg_energy_7d {
        Some(avg) => println!("  Avg energy (7 days):  {:.1} ({})", avg, energy_label(avg)),
        None => println!("  Avg energy (7 days):  No data"),
    }

    let trend = match summary.mood_trend {
        Some(MoodTrend::Up) => "improving",
        Some(MoodTrend::Down) => "declining",
        Some(MoodTrend::Stable) => "stable",
        None => "not enough data",
    };
    println!("  Mood trend:           {}", trend);

    if !summary.top_symptoms.is_empty() {
        println!();
        println!("  Top symptoms (30 days)");
        for entry in &summary.top_symptoms {
            println!("    {:<20} ×{}", entry.symptom, entry.count);
        }
    }

    let series = recent_series(&logs, today, config.trends.short_window_days);
    if !series.is_empty() {
        println!();
        println!("  Last 7 days");
        for log in &series {
            println!(
                "    {}  mood {}  energy {}",
                log.date.format("%a %b %-d"),
                log.mood.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
                log.energy.map(|e| e.to_string()).unwrap_or_else(|| "-".into()),
            );
        }
    }
    println!();

    Ok(())
}

fn cmd_export(store: &FileStore, out: PathBuf) -> Result<()> {
    let events = store.load_events()?;
    let logs = store.load_daily_logs()?;

    let events_path = out.join("cycle_events.csv");
    let logs_path = out.join("daily_logs.csv");

    let event_count = export_events_csv(&events, &events_path)?;
    let log_count = export_daily_logs_csv(&logs, &logs_path)?;

    println!("✓ Exported {} events to {}", event_count, events_path.display());
    println!("✓ Exported {} daily logs to {}", log_count, logs_path.display());
    Ok(())
}

fn parse_month(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got '{}'", s))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn format_date(date: Option<NaiveDate>, fmt: &str) -> String {
    date.map(|d| d.format(fmt).to_string())
        .unwrap_or_else(|| "—".into())
}

fn mood_label(value: f64) -> &'static str {
    const LABELS: [&str; 6] = ["", "Very Low", "Low", "Okay", "Good", "Great"];
    LABELS[(value.round() as usize).min(5)]
}

fn energy_label(value: f64) -> &'static str {
    const LABELS: [&str; 6] = ["", "Very Low", "Low", "Moderate", "High", "Very High"];
    LABELS[(value.round() as usize).min(5)]
}
