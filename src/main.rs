//! CLI entry point for timetable-manager
//!
//! Provides a command-line interface for creating a timetable, scheduling
//! and removing lectures, checking conflicts and watching collision counts.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

use timetable_manager::core::{
    parser, sweep_conflicts, Conflict, ConflictSummary, ConflictType, Course, DayOfWeek,
    EventDraft, ProgramType, Semester, SessionType,
};
use timetable_manager::scheduler::{
    unallocated_courses, ConflictPolicy, Scheduler, SchedulingError,
};
use timetable_manager::store::{EventFilter, EventStore, TimetableStore};

#[derive(Parser)]
#[command(name = "timetable-manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Path to the timetable file
    #[arg(short, long, default_value = "~/.local/share/timetable/timetable.json")]
    store: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Program {
    Day,
    Evening,
}

impl From<Program> for ProgramType {
    fn from(program: Program) -> Self {
        match program {
            Program::Day => ProgramType::Day,
            Program::Evening => ProgramType::Evening,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Session {
    #[value(name = "LH")]
    Lecture,
    #[value(name = "PH")]
    Practical,
    #[value(name = "TH")]
    Tutorial,
    #[value(name = "CH")]
    Clinical,
}

impl From<Session> for SessionType {
    fn from(session: Session) -> Self {
        match session {
            Session::Lecture => SessionType::Lecture,
            Session::Practical => SessionType::Practical,
            Session::Tutorial => SessionType::Tutorial,
            Session::Clinical => SessionType::Clinical,
        }
    }
}

#[derive(Args)]
struct AddArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[arg(long)]
    course: String,

    #[arg(long)]
    lecturer: String,

    #[arg(long)]
    room: String,

    #[arg(long)]
    department: String,

    /// Weekday for a weekly lecture (1-7 or name)
    #[arg(long, conflicts_with = "date", required_unless_present = "date")]
    day: Option<String>,

    /// Date of a one-off lecture (YYYY-MM-DD); its weekday is recorded too
    #[arg(long)]
    date: Option<String>,

    /// Semester anchor date for a weekly lecture
    #[arg(long, requires = "day")]
    anchor: Option<String>,

    /// Time range, e.g. 09:00-10:50
    #[arg(long)]
    time: String,

    #[arg(long, value_enum)]
    session: Option<Session>,

    #[arg(long, value_enum)]
    program: Option<Program>,

    #[arg(long)]
    cross_cutting: bool,

    /// Store the lecture even if it conflicts
    #[arg(long)]
    force: bool,
}

impl AddArgs {
    /// Builds the event draft.
    ///
    /// A one-off lecture records the weekday of its date, so it can be
    /// compared with weekly lectures anchored on that date.
    fn to_draft(&self) -> anyhow::Result<EventDraft> {
        let (start, end) = parser::time_range(&self.time)?;

        let (day_of_week, event_date) = match (&self.day, &self.date) {
            (Some(day), _) => (Some(parser::day_of_week(day)?), self.anchor.clone()),
            (None, Some(date)) => {
                let weekday = DayOfWeek::of_date(parser::date(date)?);
                (Some(weekday), Some(date.clone()))
            }
            (None, None) => anyhow::bail!("Either --day or --date is required"),
        };

        Ok(EventDraft {
            course_id: Some(self.course.clone()),
            lecturer_id: Some(self.lecturer.clone()),
            room_id: Some(self.room.clone()),
            department: Some(self.department.clone()),
            day_of_week: day_of_week.map(DayOfWeek::number),
            event_date,
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            is_recurring: self.day.is_some(),
            is_cross_cutting: self.cross_cutting,
            session_type: self.session.map(SessionType::from),
            program_type: self.program.map(ProgramType::from),
            ..Default::default()
        })
    }

    fn policy(&self) -> ConflictPolicy {
        if self.force {
            ConflictPolicy::Warn
        } else {
            ConflictPolicy::Reject
        }
    }
}

#[derive(Args)]
struct AddCourseArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Course id referenced by events
    #[arg(long)]
    id: String,

    #[arg(long)]
    code: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    department: String,

    /// Shared across departments; any lecture of it counts as allocated
    #[arg(long)]
    cross_cutting: bool,

    #[arg(long, value_enum)]
    program: Option<Program>,
}

impl AddCourseArgs {
    fn to_course(&self) -> Course {
        Course {
            id: self.id.clone(),
            code: self.code.clone(),
            title: self.title.clone(),
            department: self.department.clone(),
            is_cross_cutting: self.cross_cutting,
            program_type: self.program.map(ProgramType::from).unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty timetable
    Init {
        #[command(flatten)]
        store: StoreArgs,

        /// First day of the semester (YYYY-MM-DD)
        #[arg(long, requires = "semester_end")]
        semester_start: Option<String>,

        /// Last day of the semester (YYYY-MM-DD)
        #[arg(long, requires = "semester_start")]
        semester_end: Option<String>,
    },

    /// Check the whole timetable for conflicts
    Check {
        #[command(flatten)]
        store: StoreArgs,

        /// Only check one program type
        #[arg(short, long, value_enum)]
        program: Option<Program>,
    },

    /// List scheduled events
    List {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(short, long)]
        department: Option<String>,

        #[arg(short, long)]
        lecturer: Option<String>,

        #[arg(short, long, value_enum)]
        program: Option<Program>,
    },

    /// Schedule a lecture
    Add(AddArgs),

    /// Register a course so it shows up in allocation reports
    AddCourse(AddCourseArgs),

    /// Remove a scheduled lecture
    Remove {
        #[command(flatten)]
        store: StoreArgs,

        /// Event id
        id: String,
    },

    /// List courses without a scheduled lecture
    Unallocated {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print collision counts whenever the timetable changes
    Watch {
        #[command(flatten)]
        store: StoreArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            store,
            semester_start,
            semester_end,
        } => init_timetable(&store, semester_start.zip(semester_end))?,
        Commands::Check { store, program } => check_conflicts(&store, program)?,
        Commands::List {
            store,
            department,
            lecturer,
            program,
        } => {
            let mut filter = EventFilter::new();
            filter.department = department;
            filter.lecturer_id = lecturer;
            filter.program_type = program.map(ProgramType::from);
            list_events(&store, &filter)?
        }
        Commands::Add(args) => add_event(&args.store, args.to_draft()?, args.policy())?,
        Commands::AddCourse(args) => add_course(&args.store, args.to_course())?,
        Commands::Remove { store, id } => remove_event(&store, &id)?,
        Commands::Unallocated { store } => list_unallocated(&store)?,
        Commands::Watch { store } => watch_timetable(&store)?,
    }

    Ok(())
}

/// Expand tilde in the store path
fn resolve_path(args: &StoreArgs) -> anyhow::Result<PathBuf> {
    let raw = args
        .store
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

fn open_store(args: &StoreArgs) -> anyhow::Result<TimetableStore> {
    let path = resolve_path(args)?;
    TimetableStore::open(path.clone())
        .with_context(|| format!("Failed to open timetable {}", path.display()))
}

fn init_timetable(args: &StoreArgs, semester: Option<(String, String)>) -> anyhow::Result<()> {
    let path = resolve_path(args)?;

    let semester = match semester {
        Some((start, end)) => Some(Semester::new(parser::date(&start)?, parser::date(&end)?)?),
        None => None,
    };

    let store = TimetableStore::init(path.clone(), semester)
        .with_context(|| format!("Failed to create timetable {}", path.display()))?;
    println!("{} Created timetable: {}", "✓".green(), store.path().display());
    if let Some(semester) = semester {
        println!("  Semester: {}", semester.to_string().cyan());
    }

    Ok(())
}

fn print_conflicts(conflicts: &[Conflict]) {
    for (i, conflict) in conflicts.iter().enumerate() {
        let label = match conflict.conflict_type {
            ConflictType::Lecturer => "lecturer".red(),
            ConflictType::Room => "room".magenta(),
            ConflictType::Course => "course".yellow(),
        };
        println!(
            "{} {} {}",
            format!("{}.", i + 1).dimmed(),
            label.bold(),
            conflict.message
        );
        println!(
            "   {} {} ↔ {}",
            "ids:".dimmed(),
            conflict.event_ids.0.cyan(),
            conflict.event_ids.1.cyan()
        );
    }
}

/// Check the timetable for conflicts, exiting with status 1 if any exist
fn check_conflicts(args: &StoreArgs, program: Option<Program>) -> anyhow::Result<()> {
    let store = open_store(args)?;
    println!("{} Reading timetable: {}", "→".cyan(), store.path().display());

    let mut filter = EventFilter::new();
    filter.program_type = program.map(ProgramType::from);

    let scheduler = Scheduler::new(store);
    let total = scheduler.store().list_events(&filter)?.len();
    println!("{} Found {} events\n", "✓".green(), total);

    let conflicts = scheduler.conflicts(&filter)?;

    if conflicts.is_empty() {
        println!("{} {}", "✓".green().bold(), "No conflicts detected!".bold());
        return Ok(());
    }

    println!(
        "{} Found {} conflict{}:\n",
        "✗".red().bold(),
        conflicts.len(),
        if conflicts.len() == 1 { "" } else { "s" }
    );
    print_conflicts(&conflicts);

    println!("\n{}", ConflictSummary::from_conflicts(&conflicts));
    std::process::exit(1);
}

fn list_events(args: &StoreArgs, filter: &EventFilter) -> anyhow::Result<()> {
    let store = open_store(args)?;
    let events = store.list_events(filter)?;

    println!("{}", format!("Events from: {}\n", store.path().display()).bold());

    for event in &events {
        println!(
            "{} {} → {} {} {}",
            event.id.dimmed(),
            event.course_id.cyan().bold(),
            event.occurrence,
            event.time.to_string().green(),
            format!("[{} / {} / {}]", event.lecturer_id, event.room_id, event.department).dimmed(),
        );
    }

    println!("\n{} Total: {} events", "✓".green(), events.len());

    Ok(())
}

fn add_event(args: &StoreArgs, draft: EventDraft, policy: ConflictPolicy) -> anyhow::Result<()> {
    let scheduler = Scheduler::new(open_store(args)?);

    match scheduler.schedule(draft, policy) {
        Ok(proposal) => {
            println!("{} Scheduled {}", "✓".green(), proposal.event);
            println!("  id: {}", proposal.event.id.cyan());
            if !proposal.is_clear() {
                println!(
                    "\n{} Stored despite {} conflict(s):",
                    "⚠".yellow(),
                    proposal.conflicts.len()
                );
                print_conflicts(&proposal.conflicts);
            }
            Ok(())
        }
        Err(SchedulingError::Conflicts(conflicts)) => {
            println!("{} Not scheduled, {} conflict(s):\n", "✗".red().bold(), conflicts.len());
            print_conflicts(&conflicts);
            println!("\n{}", "Use --force to store it anyway.".yellow());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn add_course(args: &StoreArgs, course: Course) -> anyhow::Result<()> {
    let store = open_store(args)?;
    let label = course.to_string();
    store.add_course(course)?;

    println!("{} Registered course {}", "✓".green(), label.cyan());
    Ok(())
}

fn remove_event(args: &StoreArgs, id: &str) -> anyhow::Result<()> {
    let scheduler = Scheduler::new(open_store(args)?);
    let removed = scheduler.remove(id)?;

    println!("{} Removed {}", "✓".green(), removed);

    let still_scheduled = !scheduler
        .store()
        .list_events(&EventFilter::new().course(removed.course_id.clone()))?
        .is_empty();
    if !still_scheduled {
        println!("  Course {} is now unscheduled", removed.course_id.yellow());
    }

    Ok(())
}

fn list_unallocated(args: &StoreArgs) -> anyhow::Result<()> {
    let store = open_store(args)?;
    let document = store.read_document()?;
    let unallocated = unallocated_courses(&document.courses, &document.events);

    if unallocated.is_empty() {
        println!("{} Every course has a scheduled lecture", "✓".green());
        return Ok(());
    }

    for course in &unallocated {
        let marker = if course.is_cross_cutting { " (cross-cutting)" } else { "" };
        println!(
            "{} {} {}{}",
            course.code.cyan().bold(),
            course.title.as_deref().unwrap_or(""),
            format!("[{}]", course.department).dimmed(),
            marker.magenta()
        );
    }
    println!("\n{} {} unallocated course(s)", "⚠".yellow(), unallocated.len());

    Ok(())
}

/// Print collision counts now and after every change to the file
fn watch_timetable(args: &StoreArgs) -> anyhow::Result<()> {
    let store = open_store(args)?;
    let scheduler = Scheduler::new(store);

    println!("{} Watching {} (Ctrl+C to stop)", "→".cyan(), scheduler.store().path().display());
    println!("{}", scheduler.collision_summary(&EventFilter::new())?);

    let (tx, rx) = mpsc::channel();
    let tx = std::sync::Mutex::new(tx);
    let _subscription = scheduler.store().subscribe(
        EventFilter::new(),
        Box::new(move |snapshot| {
            if let Ok(tx) = tx.lock() {
                let _ = tx.send(snapshot);
            }
        }),
    )?;

    for snapshot in rx {
        let summary = ConflictSummary::from_conflicts(&sweep_conflicts(&snapshot));
        let line = format!("{} events, {}", snapshot.len(), summary);
        if summary.total() == 0 {
            println!("{} {}", "✓".green(), line);
        } else {
            println!("{} {}", "✗".red(), line);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_manager::core::{detect_conflicts, validate_draft};

    fn parse_add(args: &[&str]) -> AddArgs {
        let base = [
            "timetable-manager", "add", "--course", "CS101", "--lecturer", "L1", "--room", "R1",
            "--department", "CS", "--time", "09:00-10:00",
        ];
        let argv = base.iter().chain(args.iter()).copied();

        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Add(add) => add,
            _ => panic!("Expected the add command"),
        }
    }

    #[test]
    fn test_one_off_draft_records_weekday() {
        let draft = parse_add(&["--date", "2025-03-10"]).to_draft().unwrap();

        assert!(!draft.is_recurring);
        assert_eq!(draft.event_date.as_deref(), Some("2025-03-10"));
        assert_eq!(draft.day_of_week, Some(1), "2025-03-10 is a Monday");
    }

    #[test]
    fn test_one_off_clashes_with_anchored_weekly_lecture() {
        let weekly = validate_draft(
            parse_add(&["--day", "1", "--anchor", "2025-03-10"]).to_draft().unwrap(),
        )
        .unwrap();
        let one_off =
            validate_draft(parse_add(&["--date", "2025-03-10"]).to_draft().unwrap()).unwrap();

        let conflicts = detect_conflicts(&one_off, &[weekly]);
        let types: Vec<ConflictType> = conflicts.iter().map(|c| c.conflict_type).collect();
        assert_eq!(types, vec![ConflictType::Lecturer, ConflictType::Room, ConflictType::Course]);
    }

    #[test]
    fn test_weekly_draft_keeps_anchor() {
        let add = parse_add(&["--day", "tue", "--anchor", "2025-03-11", "--force"]);
        let draft = add.to_draft().unwrap();

        assert!(draft.is_recurring);
        assert_eq!(draft.day_of_week, Some(2));
        assert_eq!(draft.event_date.as_deref(), Some("2025-03-11"));
        assert_eq!(add.policy(), ConflictPolicy::Warn);
    }

    #[test]
    fn test_day_and_date_are_exclusive() {
        let argv = [
            "timetable-manager", "add", "--course", "C", "--lecturer", "L", "--room", "R",
            "--department", "D", "--time", "09:00-10:00", "--day", "1", "--date", "2025-03-10",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_add_course_builds_course() {
        let argv = [
            "timetable-manager", "add-course", "--id", "gen100", "--code", "GEN100",
            "--department", "GEN", "--cross-cutting", "--program", "evening",
        ];
        let course = match Cli::try_parse_from(argv).unwrap().command {
            Commands::AddCourse(args) => args.to_course(),
            _ => panic!("Expected the add-course command"),
        };

        assert_eq!(course.id, "gen100");
        assert!(course.is_cross_cutting);
        assert_eq!(course.program_type, ProgramType::Evening);
        assert_eq!(course.title, None);
    }
}
