#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::core::project;
use crate::error::TdError;
use crate::output::text;
use crate::task::model::TaskState;
use crate::task::tracker::{NewTask, TaskEdit, Tracker};

#[derive(Debug, Parser)]
#[command(name = "td", version, about = "File-backed task tracker")]
pub struct Cli {
    /// Directory to start looking for the project from (default: cwd)
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create .td/ in PATH (default: cwd)
    Init(InitArgs),
    /// Add a task
    Add(AddArgs),
    /// Mark a task as focus
    Focus(IdArgs),
    /// Mark a task as active
    Active(IdArgs),
    /// Mark a task as later
    Later(IdArgs),
    /// Mark a task as done
    Done(IdArgs),
    /// List tasks
    #[command(alias = "list")]
    Ls(LsArgs),
    /// Show tasks as a parent/child tree
    Tree(TreeArgs),
    /// Show one task
    Show(IdArgs),
    /// Edit task fields
    Edit(EditArgs),
    /// Move a task under a new parent
    Mv(MvArgs),
    /// Delete a task
    #[command(alias = "remove")]
    Rm(RmArgs),
    /// Count tasks per state
    Status(StatusArgs),
    Config(ConfigArgs),
    Completion(CompletionArgs),
    Version,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Explicit ID instead of one derived from the title
    #[arg(long = "id")]
    pub id: Option<String>,
    /// Parent task ID
    #[arg(short = 'p', long = "parent")]
    pub parent: Option<String>,
    /// Initial state (default: from config)
    #[arg(short = 's', long = "state", value_parser = parse_state)]
    pub state: Option<TaskState>,
}

#[derive(Debug, Parser)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Debug, Parser)]
pub struct LsArgs {
    /// Include done tasks
    #[arg(short = 'a', long = "all")]
    pub all: bool,
    /// Only tasks in this state
    #[arg(short = 's', long = "state", value_parser = parse_state)]
    pub state: Option<TaskState>,
    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,
    /// Output as CSV
    #[arg(long = "csv")]
    pub csv: bool,
}

#[derive(Debug, Parser)]
pub struct TreeArgs {
    /// Only this task and its descendants
    pub id: Option<String>,
}

#[derive(Debug, Parser)]
pub struct EditArgs {
    pub id: String,
    #[arg(long = "title")]
    pub title: Option<String>,
    /// New notes ("" clears)
    #[arg(long = "notes")]
    pub notes: Option<String>,
    /// New parent ID ("" clears)
    #[arg(long = "parent")]
    pub parent: Option<String>,
}

#[derive(Debug, Parser)]
pub struct MvArgs {
    pub id: String,
    pub parent: String,
}

#[derive(Debug, Parser)]
pub struct RmArgs {
    pub id: String,
    /// Skip confirmation
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

#[derive(Debug, Parser)]
pub struct StatusArgs {
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub cmd: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    List,
    Set(ConfigSetArgs),
    Get(ConfigGetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    pub shell: clap_complete::Shell,
}

fn parse_state(s: &str) -> Result<TaskState, String> {
    s.parse::<TaskState>().map_err(|e| e.to_string())
}

pub fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    // Quiet by default; RUST_LOG=info or RUST_LOG=debug for more.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let start = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current directory")?,
    };

    match cli.cmd {
        Commands::Init(args) => cmd_init(&start, args)?,
        Commands::Completion(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "td", &mut std::io::stdout());
        }
        Commands::Version => cmd_version(),
        Commands::Config(args) => cmd_config(&start, args)?,
        Commands::Add(args) => cmd_add(&open(&start)?, args)?,
        Commands::Focus(args) => cmd_transition(&open(&start)?, &args.id, TaskState::Focus)?,
        Commands::Active(args) => cmd_transition(&open(&start)?, &args.id, TaskState::Active)?,
        Commands::Later(args) => cmd_transition(&open(&start)?, &args.id, TaskState::Later)?,
        Commands::Done(args) => cmd_transition(&open(&start)?, &args.id, TaskState::Done)?,
        Commands::Ls(args) => cmd_ls(&open(&start)?, &args)?,
        Commands::Tree(args) => {
            let rows = open(&start)?.tree(args.id.as_deref())?;
            print!("{}", text::render_tree(&rows));
        }
        Commands::Show(args) => {
            let task = open(&start)?.get(&args.id)?;
            print!("{}", text::render_details(&task));
        }
        Commands::Edit(args) => cmd_edit(&open(&start)?, args)?,
        Commands::Mv(args) => {
            let task = open(&start)?.move_under(&args.id, &args.parent)?;
            println!("Moved {} under {}", task.id, args.parent);
        }
        Commands::Rm(args) => cmd_rm(&open(&start)?, &args)?,
        Commands::Status(args) => cmd_status(&open(&start)?, &args)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn open(start: &Path) -> anyhow::Result<Tracker> {
    Ok(Tracker::discover(start)?)
}

fn cmd_init(start: &Path, args: InitArgs) -> anyhow::Result<()> {
    let path = match args.path {
        Some(p) if p.is_absolute() => p,
        Some(p) => start.join(p),
        None => start.to_path_buf(),
    };
    let root = project::init_project(&path)?;
    println!("Initialized td project in {}", root.display());
    Ok(())
}

fn cmd_config(start: &Path, args: ConfigArgs) -> anyhow::Result<()> {
    let root = project::find_root(start)?;
    match args.cmd {
        ConfigCmd::List => print!("{}", config::list_resolved_toml(&root)?),
        ConfigCmd::Set(set) => {
            config::set_value_string(&root, &set.key, &set.value)?;
            println!("Set {} = {}", set.key, set.value);
        }
        ConfigCmd::Get(get) => match config::get_value_string(&root, &get.key)? {
            Some(v) => println!("{v}"),
            None => anyhow::bail!(
                "configuration key '{}' not found - use 'td config list' to see available keys",
                get.key
            ),
        },
    }
    Ok(())
}

fn cmd_add(tracker: &Tracker, args: AddArgs) -> anyhow::Result<()> {
    let task = tracker.create(NewTask {
        title: args.title,
        id: args.id,
        parent: args.parent,
        state: args.state,
    })?;
    println!("Created {} [{}]", task.id, task.state);
    Ok(())
}

fn cmd_transition(tracker: &Tracker, id: &str, state: TaskState) -> anyhow::Result<()> {
    let task = tracker.transition(id, state)?;
    println!("{} -> {}", task.id, task.state);
    Ok(())
}

fn cmd_ls(tracker: &Tracker, args: &LsArgs) -> anyhow::Result<()> {
    let tasks = tracker.list(args.state, args.all)?;

    if args.json {
        let mut s = serde_json::to_string_pretty(&tasks)?;
        s.push('\n');
        print!("{s}");
        return Ok(());
    }

    let table = text::task_table(&tasks);
    if args.csv {
        table.write_csv(std::io::stdout().lock())?;
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    table.write_aligned(std::io::stdout().lock())?;
    Ok(())
}

fn cmd_edit(tracker: &Tracker, args: EditArgs) -> anyhow::Result<()> {
    if args.title.is_none() && args.notes.is_none() && args.parent.is_none() {
        anyhow::bail!("nothing to edit: pass --title, --notes or --parent");
    }
    let task = tracker.edit(
        &args.id,
        TaskEdit {
            title: args.title,
            notes: args.notes,
            parent: args.parent,
        },
    )?;
    println!("Updated {}", task.id);
    Ok(())
}

fn cmd_rm(tracker: &Tracker, args: &RmArgs) -> anyhow::Result<()> {
    let task = tracker.get(&args.id)?;
    if !args.force && !confirm_remove(&task.id, &task.title)? {
        return Err(TdError::Cancelled.into());
    }
    tracker.remove(&task.id)?;
    println!("Deleted {}", task.id);
    Ok(())
}

fn confirm_remove(id: &str, title: &str) -> anyhow::Result<bool> {
    print!("Delete {id} ({title})? (y/N): ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input)?;
    let resp = input.trim().to_lowercase();
    Ok(resp == "y" || resp == "yes")
}

fn cmd_status(tracker: &Tracker, args: &StatusArgs) -> anyhow::Result<()> {
    let counts = tracker.counts()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }
    println!("project: {}", tracker.config().project);
    print!("{}", text::render_status(&counts));
    Ok(())
}

fn cmd_version() {
    println!("td version {}", env!("CARGO_PKG_VERSION"));
    println!("  rust: {}", rustc_version_runtime::version());
    println!(
        "  os/arch: {}/{}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("td").chain(args.iter().copied())).unwrap()
    }

    fn run_in(dir: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
        let mut cli = parse(args);
        cli.dir = Some(dir.to_path_buf());
        run(cli)
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_state_and_parent() {
        let cli = parse(&["add", "Urgent", "--state", "focus", "--parent", "root"]);
        let Commands::Add(args) = cli.cmd else {
            panic!("expected add");
        };
        assert_eq!(args.title, "Urgent");
        assert_eq!(args.state, Some(TaskState::Focus));
        assert_eq!(args.parent.as_deref(), Some("root"));
    }

    #[test]
    fn rejects_unknown_state() {
        assert!(Cli::try_parse_from(["td", "add", "X", "--state", "blocked"]).is_err());
        assert!(Cli::try_parse_from(["td", "ls", "--json", "--csv"]).is_err());
    }

    #[test]
    fn edit_distinguishes_empty_from_absent() {
        let cli = parse(&["edit", "child", "--parent", ""]);
        let Commands::Edit(args) = cli.cmd else {
            panic!("expected edit");
        };
        assert_eq!(args.parent.as_deref(), Some(""));
        assert_eq!(args.notes, None);
    }

    #[test]
    fn end_to_end_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_in(dir.path(), &["init"]).unwrap();
        run_in(dir.path(), &["add", "Parent"]).unwrap();
        run_in(dir.path(), &["add", "Child", "--parent", "parent"]).unwrap();
        run_in(dir.path(), &["add", "Child"]).unwrap();
        run_in(dir.path(), &["done", "child"]).unwrap();
        run_in(dir.path(), &["mv", "child-2", "parent"]).unwrap();
        run_in(dir.path(), &["edit", "child", "--notes", "hello"]).unwrap();
        run_in(dir.path(), &["ls", "--all"]).unwrap();
        run_in(dir.path(), &["tree", "parent"]).unwrap();
        run_in(dir.path(), &["status"]).unwrap();
        run_in(dir.path(), &["rm", "child-2", "--force"]).unwrap();

        let tracker = Tracker::discover(dir.path()).unwrap();
        let child = tracker.get("child").unwrap();
        assert_eq!(child.state, TaskState::Done);
        assert_eq!(child.notes.as_deref(), Some("hello"));
        assert!(!tracker.storage().exists("child-2"));
    }

    #[test]
    fn task_commands_need_a_project() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = run_in(dir.path(), &["ls"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TdError>(),
            Some(TdError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn missing_task_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_in(dir.path(), &["init"]).unwrap();
        let err = run_in(dir.path(), &["show", "nope"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TdError>(),
            Some(TdError::TaskNotFound(_))
        ));
        assert!(run_in(dir.path(), &["edit", "nope"]).is_err());
    }

    #[test]
    fn config_commands_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_in(dir.path(), &["init"]).unwrap();
        run_in(dir.path(), &["config", "set", "default_state", "focus"]).unwrap();
        run_in(dir.path(), &["add", "Hot"]).unwrap();
        let tracker = Tracker::discover(dir.path()).unwrap();
        assert_eq!(tracker.get("hot").unwrap().state, TaskState::Focus);
        assert!(run_in(dir.path(), &["config", "get", "missing"]).is_err());
    }
}
