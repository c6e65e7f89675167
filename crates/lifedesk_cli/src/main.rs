//! `lifedesk` terminal client.
//!
//! Thin view layer over `lifedesk_core`: parses intents, dispatches them to
//! the session store or a controller, and prints the resulting snapshot.

mod views;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use lifedesk_core::config::{default_data_dir, DEFAULT_BASE_URL};
use lifedesk_core::controller::{ControllerContext, NotesController, ProblemsController};
use lifedesk_core::gate::{resolve, RouteDecision};
use lifedesk_core::model::expense::{ExpenseFilter, Period};
use lifedesk_core::model::forms::{ExpenseForm, FormError, GroupForm, ProblemForm, RegisterForm, TodoForm};
use lifedesk_core::model::group::GroupExpenseFilter;
use lifedesk_core::model::notes::PageDraft;
use lifedesk_core::model::problem::{Difficulty, ProblemFilter, ProblemStatus, TagDraft};
use lifedesk_core::model::todo::{TodoScope, TodoStatus};
use lifedesk_core::model::user::UserSummary;
use lifedesk_core::session::StorageError;
use lifedesk_core::{
    default_log_level, init_logging, ApiClient, ApiError, ClientConfig, ConfigError, Credentials,
    EntityId, ExpensesController, GroupsController, LoggingConfig, LoggingError, SessionError,
    SessionStore, SqliteSessionStorage, TagsController, TodosController,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use views::{TerminalConfirm, TerminalNotifier};

#[derive(Debug, Parser)]
#[command(name = "lifedesk", version, about = "Expenses, groups, notes, todos and DSA practice from the terminal")]
struct Cli {
    /// Versioned API base URL.
    #[arg(long, env = "LIFEDESK_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// Directory for the session database and logs.
    #[arg(long, env = "LIFEDESK_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "LIFEDESK_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Answer yes to delete confirmations.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account, then sign in.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in profile.
    Whoami,
    /// Show what a path resolves to for the current session.
    Route { path: String },
    #[command(subcommand)]
    Expenses(ExpensesCommand),
    #[command(subcommand)]
    Groups(GroupsCommand),
    #[command(subcommand)]
    Todos(TodosCommand),
    #[command(subcommand)]
    Notes(NotesCommand),
    #[command(subcommand)]
    Problems(ProblemsCommand),
    #[command(subcommand)]
    Tags(TagsCommand),
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: Option<String>,
    #[arg(long, default_value = "")]
    age: String,
    #[arg(long, default_value = "")]
    gender: String,
    #[arg(long, default_value = "")]
    country: String,
}

#[derive(Debug, Args)]
struct PeriodArgs {
    /// day, month or year.
    #[arg(long, default_value = "month", value_parser = parse_period)]
    period: Period,
    /// Anchor date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum ExpensesCommand {
    List(PeriodArgs),
    Add {
        amount: String,
        description: String,
        #[arg(long, default_value = "")]
        group: String,
        #[command(flatten)]
        period: PeriodArgs,
    },
    Delete {
        id: EntityId,
        #[command(flatten)]
        period: PeriodArgs,
    },
}

#[derive(Debug, Subcommand)]
enum GroupsCommand {
    List,
    Create {
        name: String,
        /// Member user ids.
        #[arg(long = "member")]
        members: Vec<EntityId>,
    },
    Show {
        id: EntityId,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        user: Option<EntityId>,
    },
    Delete { id: EntityId },
    AddMember { group: EntityId, user: EntityId },
    /// Search users by name or email (at least two characters).
    Search { query: String },
}

#[derive(Debug, Subcommand)]
enum TodosCommand {
    List {
        #[arg(long)]
        completed: bool,
    },
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        due: String,
    },
    Status {
        id: EntityId,
        #[arg(value_parser = parse_todo_status)]
        status: TodoStatus,
    },
    Delete { id: EntityId },
}

#[derive(Debug, Subcommand)]
enum NotesCommand {
    Notebooks,
    Sections { notebook: EntityId },
    Pages { notebook: EntityId, section: EntityId },
    Show { notebook: EntityId, section: EntityId, page: EntityId },
    NewNotebook { title: String },
    NewSection { notebook: EntityId, title: String },
    NewPage {
        notebook: EntityId,
        section: EntityId,
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    SavePage {
        notebook: EntityId,
        section: EntityId,
        page: EntityId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    DeleteNotebook { notebook: EntityId },
    DeleteSection { notebook: EntityId, section: EntityId },
    DeletePage { notebook: EntityId, section: EntityId, page: EntityId },
}

#[derive(Debug, Subcommand)]
enum ProblemsCommand {
    List {
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,
        #[arg(long, value_parser = parse_problem_status)]
        status: Option<ProblemStatus>,
        #[arg(long)]
        tag: Option<EntityId>,
        /// Local text filter over title and description.
        #[arg(long)]
        search: Option<String>,
    },
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_parser = parse_difficulty, default_value = "easy")]
        difficulty: Difficulty,
        #[arg(long = "tag")]
        tags: Vec<EntityId>,
    },
    SetStatus {
        id: EntityId,
        #[arg(value_parser = parse_problem_status)]
        status: ProblemStatus,
    },
    Delete { id: EntityId },
}

#[derive(Debug, Subcommand)]
enum TagsCommand {
    List,
    Add { name: String },
}

fn parse_period(value: &str) -> Result<Period, String> {
    Period::parse(value).ok_or_else(|| format!("unknown period `{value}`"))
}

fn parse_todo_status(value: &str) -> Result<TodoStatus, String> {
    TodoStatus::parse(value).ok_or_else(|| format!("unknown todo status `{value}`"))
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    Difficulty::parse(value).ok_or_else(|| format!("unknown difficulty `{value}`"))
}

fn parse_problem_status(value: &str) -> Result<ProblemStatus, String> {
    ProblemStatus::parse(value).ok_or_else(|| format!("unknown problem status `{value}`"))
}

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Storage(StorageError),
    Session(SessionError),
    Form(FormError),
    Prompt(dialoguer::Error),
    /// Already shown to the user by a controller notification.
    Reported(ApiError),
    Usage(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{}", err.user_message()),
            Self::Form(err) => write!(f, "{err}"),
            Self::Prompt(err) => write!(f, "prompt failed: {err}"),
            Self::Reported(err) => write!(f, "{err}"),
            Self::Usage(message) => f.write_str(message),
        }
    }
}

impl Error for CliError {}

macro_rules! cli_error_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for CliError {
            fn from(value: $source) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

cli_error_from!(
    ConfigError => Config,
    LoggingError => Logging,
    StorageError => Storage,
    SessionError => Session,
    FormError => Form,
    dialoguer::Error => Prompt,
    ApiError => Reported,
);

type CliResult = Result<(), CliError>;

/// Everything a command needs once the session is restored.
struct App {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    confirm: TerminalConfirm,
}

impl App {
    fn bootstrap(cli: &Cli) -> Result<Self, CliError> {
        let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
        let config = ClientConfig::new(&cli.api_url, data_dir)?;

        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        init_logging(&LoggingConfig::new(level, config.log_dir()).with_stderr(true))?;

        let api = ApiClient::from_config(&config).map_err(|err| CliError::Usage(err.to_string()))?;
        let storage = SqliteSessionStorage::open(config.session_db_path())?;
        let session = SessionStore::restore(Box::new(storage))?;
        info!(
            "event=cli_start module=cli status=ok base_url={} authenticated={}",
            config.base_url,
            session.reader().is_authenticated()
        );
        Ok(Self {
            config,
            api,
            session,
            confirm: TerminalConfirm {
                assume_yes: cli.yes,
            },
        })
    }

    fn context(&self) -> ControllerContext {
        ControllerContext::new(
            self.api.clone(),
            self.session.reader(),
            Arc::new(TerminalNotifier),
        )
    }

    fn require_session(&self) -> CliResult {
        if self.session.reader().is_authenticated() {
            Ok(())
        } else {
            Err(CliError::Usage(
                "not signed in; run `lifedesk login <username>` first".to_string(),
            ))
        }
    }
}

fn prompt_password(provided: Option<String>) -> Result<String, CliError> {
    match provided {
        Some(password) => Ok(password),
        None => Ok(Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?),
    }
}

fn expense_filter(args: &PeriodArgs) -> ExpenseFilter {
    match args.date {
        Some(date) => ExpenseFilter::new(args.period, date),
        None => ExpenseFilter {
            period: args.period,
            ..ExpenseFilter::default()
        },
    }
}

async fn run(cli: Cli) -> CliResult {
    let mut app = App::bootstrap(&cli)?;
    match cli.command {
        Command::Login { username, password } => {
            let password = prompt_password(password)?;
            let api = app.api.clone();
            let user = app
                .session
                .login(&api, &Credentials::new(username, password))
                .await?;
            println!("Signed in as {}", user.username);
        }
        Command::Register(args) => {
            let password = match args.password {
                Some(password) => password,
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("Password")
                    .with_confirmation("Repeat password", "Passwords do not match")
                    .interact()?,
            };
            let form = RegisterForm {
                email: args.email,
                username: args.username,
                password,
                age: args.age,
                gender: args.gender,
                country: args.country,
            };
            let api = app.api.clone();
            let user = app.session.register_and_login(&api, &form).await?;
            println!("Welcome, {}", user.username);
        }
        Command::Logout => {
            app.session.sign_out()?;
            println!("Signed out");
        }
        Command::Whoami => match app.session.reader().profile() {
            Some(user) => views::profile(&user),
            None if app.session.reader().is_authenticated() => {
                println!("Signed in (profile unavailable)")
            }
            None => println!("Not signed in"),
        },
        Command::Route { path } => match resolve(&app.session.state(), &path) {
            RouteDecision::Render(route) => println!("render {}", route.path()),
            RouteDecision::Redirect(route) => println!("redirect {}", route.path()),
            RouteDecision::NotFound => println!("not found"),
        },
        Command::Expenses(command) => {
            app.require_session()?;
            run_expenses(&app, command).await?;
        }
        Command::Groups(command) => {
            app.require_session()?;
            run_groups(&app, command).await?;
        }
        Command::Todos(command) => {
            app.require_session()?;
            run_todos(&app, command).await?;
        }
        Command::Notes(command) => {
            app.require_session()?;
            run_notes(&app, command).await?;
        }
        Command::Problems(command) => {
            app.require_session()?;
            run_problems(&app, command).await?;
        }
        Command::Tags(command) => {
            app.require_session()?;
            let tags = TagsController::new(app.context(), ());
            match command {
                TagsCommand::List => views::tags(&tags.load(()).await?),
                TagsCommand::Add { name } => {
                    tags.create(&TagDraft { name }).await?;
                    views::tags(&tags.items());
                }
            }
        }
    }
    Ok(())
}

async fn run_expenses(app: &App, command: ExpensesCommand) -> CliResult {
    match command {
        ExpensesCommand::List(period) => {
            let filter = expense_filter(&period);
            let expenses = ExpensesController::new(app.context(), filter);
            views::expenses(&expenses.load(filter).await?);
        }
        ExpensesCommand::Add {
            amount,
            description,
            group,
            period,
        } => {
            let draft = ExpenseForm {
                amount,
                description,
                group_id: group,
            }
            .to_draft()?;
            let expenses = ExpensesController::new(app.context(), expense_filter(&period));
            expenses.create(&draft).await?;
            views::expenses(&expenses.items());
        }
        ExpensesCommand::Delete { id, period } => {
            let filter = expense_filter(&period);
            let expenses = ExpensesController::new(app.context(), filter);
            expenses.load(filter).await?;
            expenses.delete(id, &app.confirm).await?;
            views::expenses(&expenses.items());
        }
    }
    Ok(())
}

async fn run_groups(app: &App, command: GroupsCommand) -> CliResult {
    let groups = GroupsController::new(app.context(), &app.config);
    match command {
        GroupsCommand::List => {
            let rows = groups.collection().load(()).await?;
            views::titled(rows.iter().map(|group| (group.id, group.name.as_str())));
        }
        GroupsCommand::Create { name, members } => {
            let mut form = GroupForm::new(name);
            for id in members {
                form.add_member(UserSummary {
                    id,
                    username: String::new(),
                    email: None,
                });
            }
            let created = groups.collection().create(&form.to_draft()?).await?;
            println!("#{} {}", created.id, created.name);
        }
        GroupsCommand::Show { id, from, to, user } => {
            let details = groups.details(id).await?;
            let filter = GroupExpenseFilter {
                date_from: from,
                date_to: to,
                user_id: user,
            };
            views::group_details(&details, &details.filtered_expenses(&filter));
        }
        GroupsCommand::Delete { id } => {
            groups.delete(id, &app.confirm).await?;
        }
        GroupsCommand::AddMember { group, user } => {
            groups.add_member(group, user).await?;
        }
        GroupsCommand::Search { query } => {
            let search = groups.member_search();
            search.set_query(&query);
            search.settle().await;
            if query.trim().chars().count() < app.config.search_min_chars {
                println!(
                    "Type at least {} characters to search",
                    app.config.search_min_chars
                );
            } else {
                views::users(&search.results());
            }
        }
    }
    Ok(())
}

async fn run_todos(app: &App, command: TodosCommand) -> CliResult {
    match command {
        TodosCommand::List { completed } => {
            let scope = if completed {
                TodoScope::Completed
            } else {
                TodoScope::Active
            };
            let todos = TodosController::new(app.context(), scope);
            views::todos(&todos.load(scope).await?);
        }
        TodosCommand::Add {
            title,
            description,
            due,
        } => {
            let draft = TodoForm {
                title,
                description,
                due_date: due,
                ..TodoForm::default()
            }
            .to_draft()?;
            let todos = TodosController::new(app.context(), TodoScope::Active);
            todos.create(&draft).await?;
            views::todos(&todos.items());
        }
        TodosCommand::Status { id, status } => {
            let todos = TodosController::new(app.context(), TodoScope::Active);
            let mut loaded = todos.load(TodoScope::Active).await?;
            if !loaded.iter().any(|todo| todo.id == id) {
                loaded = todos.load(TodoScope::Completed).await?;
            }
            if !loaded.iter().any(|todo| todo.id == id) {
                return Err(CliError::Usage(format!("todo {id} not found")));
            }
            todos.set_status(id, status).await?;
        }
        TodosCommand::Delete { id } => {
            let todos = TodosController::new(app.context(), TodoScope::Active);
            todos.delete(id, &app.confirm).await?;
        }
    }
    Ok(())
}

/// Walks the selection chain down to `notebook` and, when given, `section`.
async fn select_path(
    notes: &NotesController,
    notebook: EntityId,
    section: Option<EntityId>,
) -> CliResult {
    let notebooks = notes.load_notebooks().await?;
    let notebook = notebooks
        .into_iter()
        .find(|row| row.id == notebook)
        .ok_or_else(|| CliError::Usage(format!("notebook {notebook} not found")))?;
    let sections = notes.select_notebook(notebook).await?;

    if let Some(section) = section {
        let section = sections
            .into_iter()
            .find(|row| row.id == section)
            .ok_or_else(|| CliError::Usage(format!("section {section} not found")))?;
        notes.select_section(section).await?;
    }
    Ok(())
}

fn open_page(notes: &NotesController, page: EntityId) -> CliResult {
    let row = notes
        .pages()
        .find(page)
        .ok_or_else(|| CliError::Usage(format!("page {page} not found")))?;
    notes.open_page(row)?;
    Ok(())
}

async fn run_notes(app: &App, command: NotesCommand) -> CliResult {
    let notes = NotesController::new(app.context());
    match command {
        NotesCommand::Notebooks => views::notebooks(&notes.load_notebooks().await?),
        NotesCommand::Sections { notebook } => {
            select_path(&notes, notebook, None).await?;
            views::sections(&notes.sections().items());
        }
        NotesCommand::Pages { notebook, section } => {
            select_path(&notes, notebook, Some(section)).await?;
            views::pages(&notes.pages().items());
        }
        NotesCommand::Show {
            notebook,
            section,
            page,
        } => {
            select_path(&notes, notebook, Some(section)).await?;
            open_page(&notes, page)?;
            if let Some(open) = notes.selection().page() {
                views::page(open);
            }
        }
        NotesCommand::NewNotebook { title } => {
            let created = notes.create_notebook(&title).await?;
            println!("#{} {}", created.id, created.title);
        }
        NotesCommand::NewSection { notebook, title } => {
            select_path(&notes, notebook, None).await?;
            let created = notes.create_section(&title).await?;
            println!("#{} {}", created.id, created.title);
        }
        NotesCommand::NewPage {
            notebook,
            section,
            title,
            content,
        } => {
            select_path(&notes, notebook, Some(section)).await?;
            let created = notes.create_page(&PageDraft { title, content }).await?;
            views::page(&created);
        }
        NotesCommand::SavePage {
            notebook,
            section,
            page,
            title,
            content,
        } => {
            select_path(&notes, notebook, Some(section)).await?;
            open_page(&notes, page)?;
            let current = notes
                .selection()
                .page()
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("page {page} not found")))?;
            let content = match content {
                Some(content) => content,
                None => Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt("Content")
                    .with_initial_text(current.content.clone().unwrap_or_default())
                    .allow_empty(true)
                    .interact_text()?,
            };
            let draft = PageDraft {
                title: title.unwrap_or(current.title),
                content,
            };
            let saved = notes.save_page(page, &draft).await?;
            views::page(&saved);
        }
        NotesCommand::DeleteNotebook { notebook } => {
            notes.load_notebooks().await?;
            notes.delete_notebook(notebook, &app.confirm).await?;
        }
        NotesCommand::DeleteSection { notebook, section } => {
            select_path(&notes, notebook, None).await?;
            notes.delete_section(section, &app.confirm).await?;
        }
        NotesCommand::DeletePage {
            notebook,
            section,
            page,
        } => {
            select_path(&notes, notebook, Some(section)).await?;
            notes.delete_page(page, &app.confirm).await?;
        }
    }
    Ok(())
}

async fn run_problems(app: &App, command: ProblemsCommand) -> CliResult {
    match command {
        ProblemsCommand::List {
            difficulty,
            status,
            tag,
            search,
        } => {
            let filter = ProblemFilter {
                difficulty,
                status,
                tag_id: tag,
            };
            let problems = ProblemsController::new(app.context(), filter);
            problems.load(filter).await?;
            views::problems(&problems.search(search.as_deref().unwrap_or_default()));
        }
        ProblemsCommand::Add {
            title,
            description,
            difficulty,
            tags,
        } => {
            let draft = ProblemForm {
                title,
                description,
                difficulty,
                tag_ids: tags,
                ..ProblemForm::default()
            }
            .to_draft()?;
            let problems = ProblemsController::new(app.context(), ProblemFilter::default());
            problems.create(&draft).await?;
            views::problems(&problems.items());
        }
        ProblemsCommand::SetStatus { id, status } => {
            let problems = ProblemsController::new(app.context(), ProblemFilter::default());
            problems.load(ProblemFilter::default()).await?;
            let problem = problems
                .find(id)
                .ok_or_else(|| CliError::Usage(format!("problem {id} not found")))?;
            let mut form = ProblemForm::from_problem(&problem);
            form.status = status;
            problems.update(id, &form.to_draft()?).await?;
        }
        ProblemsCommand::Delete { id } => {
            let problems = ProblemsController::new(app.context(), ProblemFilter::default());
            problems.delete(id, &app.confirm).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Reported(_)) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
