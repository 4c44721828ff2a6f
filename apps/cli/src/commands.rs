//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::{debug, info};

use kmportal_core::{
    AttributeFilter, BreadcrumbTarget, ContributionStore, ExplorerNav, FilterOutcome, ReviewTab,
    SubmissionDraft, SystemClock, TaxonomyFilter, ValidationErrors, authorize_resubmit,
    authorize_review_action, authorize_reviewer, check_update, review_queue, seed,
};
use kmportal_shared::{
    AppConfig, AssetStatus, Catalog, ContributionId, ContributionUpdate, FileRef,
    KnowledgeContribution, Locale, Topic, User, Vocabulary, expand_home, init_config, load_config,
};
use kmportal_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kmportal: submit, review, and explore organizational knowledge.
#[derive(Parser)]
#[command(
    name = "kmportal",
    version,
    about = "Submit, review, and explore organizational knowledge.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory holding the snapshot and session (overrides config).
    #[arg(long, global = true, env = "KMPORTAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Display language: en or id (overrides config).
    #[arg(long, global = true)]
    pub locale: Option<Locale>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in with a demo account.
    Login {
        /// Account email (case-insensitive).
        email: String,

        /// Account password.
        #[arg(long, env = "KMPORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Submit a document for review.
    Submit(SubmitArgs),

    /// List your own contributions.
    Mine {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Review contributions (admin and SME only).
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Resubmit one of your contributions with changes.
    Resubmit(ResubmitArgs),

    /// Browse published knowledge assets.
    Explore(ExploreArgs),

    /// Show the department and topic tree.
    Tree {
        /// Only show this department.
        #[arg(long)]
        department: Option<String>,
    },

    /// List a tag vocabulary.
    Vocab {
        #[arg(value_enum, default_value = "doc-types")]
        kind: VocabKind,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Fields of a new submission. Blank fields are reported by validation.
#[derive(Args)]
pub(crate) struct SubmitArgs {
    /// Document title.
    #[arg(long)]
    pub title: Option<String>,

    /// Path to the PDF being contributed.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Knowledge topic id (see `kmportal vocab topics`).
    #[arg(long)]
    pub knowledge_topic: Option<String>,

    /// Specific topic offered by the knowledge topic.
    #[arg(long)]
    pub specific_topic: Option<String>,

    /// Document type id (tag level 1).
    #[arg(long)]
    pub doc_type: Option<String>,

    /// Priority topic ids (tag level 2).
    #[arg(long, value_delimiter = ',')]
    pub priority: Vec<String>,

    /// Free keywords (tag level 3, after the specific topic).
    #[arg(long, value_delimiter = ',')]
    pub keyword: Vec<String>,
}

/// Content changes for a resubmission. Omitted fields keep their value.
#[derive(Args)]
pub(crate) struct ResubmitArgs {
    /// Contribution id.
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Document type id (tag level 1).
    #[arg(long)]
    pub doc_type: Option<String>,

    /// Replace the priority topics (tag level 2).
    #[arg(long, value_delimiter = ',')]
    pub priority: Option<Vec<String>>,

    /// Replace tag level 3: the specific topic first, then keywords.
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

/// Explorer selection, search text, and attribute filters.
#[derive(Args)]
pub(crate) struct ExploreArgs {
    /// Department id.
    #[arg(long)]
    pub department: Option<String>,

    /// Topic id at any depth; selects its department too.
    #[arg(long)]
    pub topic: Option<String>,

    /// Search text matched against title, tags, and author.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Asset status filter: all, official, validated, or reference.
    #[arg(long, default_value = "all")]
    pub status: AttributeFilter<AssetStatus>,

    /// Document type filter: all or a document type id.
    #[arg(long, default_value = "all")]
    pub doc_type: AttributeFilter<String>,

    /// Follow a breadcrumb after selecting: -1 for all departments, 0 for
    /// the department, k for the k-th topic on the trail.
    #[arg(long, allow_negative_numbers = true)]
    pub crumb: Option<isize>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Review subcommands.
#[derive(Subcommand)]
pub(crate) enum ReviewAction {
    /// List the review queue.
    List {
        /// Tab: all, pending, approved, or rejected.
        #[arg(long, default_value = "pending")]
        tab: ReviewTab,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Approve a contribution.
    Approve {
        /// Contribution id.
        id: String,
    },
    /// Reject a contribution with a reason.
    Reject {
        /// Contribution id.
        id: String,

        /// Why the contribution is rejected (required).
        #[arg(long)]
        reason: String,
    },
}

/// Vocabularies the submission form offers.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum VocabKind {
    /// Document types (tag level 1).
    DocTypes,
    /// Priority topics (tag level 2).
    Priorities,
    /// Knowledge topics and their specific topics.
    Topics,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kmportal=info",
        1 => "kmportal=debug",
        _ => "kmportal=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command context
// ---------------------------------------------------------------------------

/// Resolved configuration plus the opened data directory.
struct Context {
    config: AppConfig,
    locale: Locale,
    storage: Storage,
}

impl Context {
    /// Flags win over the config file.
    fn load(data_dir: Option<&Path>, locale: Option<Locale>) -> Result<Self> {
        let config = load_config()?;
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => config.data_dir()?,
        };
        let locale = locale.unwrap_or(config.defaults.locale);
        let storage = Storage::open(&data_dir)?;
        debug!(data_dir = %data_dir.display(), ?locale, "context ready");
        Ok(Self {
            config,
            locale,
            storage,
        })
    }

    /// The saved collection, or the sample contributions on first use.
    fn store(&self) -> Result<ContributionStore> {
        match self.storage.load_contributions()? {
            Some(contributions) => Ok(ContributionStore::from_contributions(
                contributions,
                SystemClock,
            )?),
            None => {
                debug!("no snapshot yet, starting from sample contributions");
                Ok(seed::store(SystemClock)?)
            }
        }
    }

    fn save(&self, store: &ContributionStore) -> Result<()> {
        self.storage.save_contributions(store.contributions())?;
        Ok(())
    }

    fn current_user(&self) -> Result<User> {
        self.storage.load_session()?.ok_or_else(|| {
            eyre!("not signed in: run `kmportal login <email> --password <password>`")
        })
    }

    fn catalog(&self) -> Result<Catalog> {
        let path = self
            .config
            .catalog
            .path
            .as_deref()
            .map(expand_home)
            .transpose()?;
        Ok(seed::load_catalog(path.as_deref())?)
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let Cli {
        data_dir,
        locale,
        command,
        ..
    } = cli;
    let ctx = || Context::load(data_dir.as_deref(), locale);

    match command {
        Command::Login { email, password } => cmd_login(&ctx()?, &email, &password),
        Command::Logout => cmd_logout(&ctx()?),
        Command::Whoami => cmd_whoami(&ctx()?),
        Command::Submit(args) => cmd_submit(&ctx()?, args),
        Command::Mine { json } => cmd_mine(&ctx()?, json),
        Command::Review { action } => match action {
            ReviewAction::List { tab, json } => cmd_review_list(&ctx()?, tab, json),
            ReviewAction::Approve { id } => cmd_review_decide(&ctx()?, &id, None),
            ReviewAction::Reject { id, reason } => {
                cmd_review_decide(&ctx()?, &id, Some(&reason))
            }
        },
        Command::Resubmit(args) => cmd_resubmit(&ctx()?, args),
        Command::Explore(args) => cmd_explore(&ctx()?, args),
        Command::Tree { department } => cmd_tree(&ctx()?, department.as_deref()),
        Command::Vocab { kind } => cmd_vocab(&ctx()?, kind),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

fn cmd_login(ctx: &Context, email: &str, password: &str) -> Result<()> {
    let user = seed::accounts().login(email, password)?;
    ctx.storage.save_session(&user)?;
    println!("Signed in as {} ({})", user.name, user.role);
    Ok(())
}

fn cmd_logout(ctx: &Context) -> Result<()> {
    if ctx.storage.clear_session()? {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

fn cmd_whoami(ctx: &Context) -> Result<()> {
    match ctx.storage.load_session()? {
        Some(user) => {
            println!("  Name:       {}", user.name);
            println!("  Email:      {}", user.email);
            println!("  Role:       {}", user.role);
            if let Some(dept) = &user.department {
                println!("  Department: {dept}");
            }
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Contributions
// ---------------------------------------------------------------------------

fn cmd_submit(ctx: &Context, args: SubmitArgs) -> Result<()> {
    let user = ctx.current_user()?;

    let file = match &args.file {
        Some(path) if !path.is_file() => {
            return Err(eyre!("no such file: {}", path.display()));
        }
        Some(path) => Some(file_ref(path)),
        None => None,
    };

    let draft = SubmissionDraft {
        title: args.title.unwrap_or_default(),
        file,
        knowledge_topic: args.knowledge_topic.unwrap_or_default(),
        specific_topic: args.specific_topic.unwrap_or_default(),
        tag_level1: args.doc_type.unwrap_or_default(),
        tag_level2: args.priority,
        keywords: args.keyword,
    };

    let input = draft
        .validate(&seed::vocabulary(), &user.as_contributor())
        .map_err(|e| refused(&e, ctx.locale))?;

    let mut store = ctx.store()?;
    let id = store.create(input).id.clone();
    ctx.save(&store)?;

    info!(%id, contributor = %user.id, "submission stored");
    println!("Submitted {id}; awaiting review.");
    Ok(())
}

fn cmd_mine(ctx: &Context, json: bool) -> Result<()> {
    let user = ctx.current_user()?;
    let store = ctx.store()?;
    let mine = store.list_by_contributor(&user.id);

    if json {
        println!("{}", serde_json::to_string_pretty(&mine)?);
        return Ok(());
    }
    if mine.is_empty() {
        println!("You have not submitted anything yet.");
        return Ok(());
    }

    let vocab = seed::vocabulary();
    for c in mine {
        print_contribution(c, &vocab, ctx.locale);
    }
    Ok(())
}

fn cmd_review_list(ctx: &Context, tab: ReviewTab, json: bool) -> Result<()> {
    let user = ctx.current_user()?;
    authorize_reviewer(&user)?;

    let store = ctx.store()?;
    let queue = review_queue(&store, tab);

    if json {
        println!("{}", serde_json::to_string_pretty(&queue)?);
        return Ok(());
    }

    let counts = store.status_counts();
    println!(
        "  pending: {}  approved: {}  rejected: {}  total: {}",
        counts.pending,
        counts.approved,
        counts.rejected,
        counts.total()
    );
    println!();

    if queue.is_empty() {
        println!("Nothing to show.");
        return Ok(());
    }

    let vocab = seed::vocabulary();
    for c in queue {
        print_contribution(c, &vocab, ctx.locale);
    }
    Ok(())
}

/// Approve when `reason` is `None`, reject otherwise.
fn cmd_review_decide(ctx: &Context, id: &str, reason: Option<&str>) -> Result<()> {
    let user = ctx.current_user()?;
    let reviewer = authorize_reviewer(&user)?;

    let mut store = ctx.store()?;
    let id = ContributionId::from(id);
    let current = store
        .get(&id)
        .ok_or_else(|| eyre!("contribution not found: {id}"))?;
    authorize_review_action(current)?;

    let status = match reason {
        None => store.approve(&id, &reviewer)?.status(),
        Some(reason) => store.reject(&id, &reviewer, reason)?.status(),
    };
    ctx.save(&store)?;
    println!("{id} is now {status}.");
    Ok(())
}

fn cmd_resubmit(ctx: &Context, args: ResubmitArgs) -> Result<()> {
    let user = ctx.current_user()?;
    let mut store = ctx.store()?;
    let id = ContributionId::from(args.id.as_str());

    let current = store
        .get(&id)
        .ok_or_else(|| eyre!("contribution not found: {id}"))?;
    authorize_resubmit(&user, current)?;

    if let Some(path) = &args.file {
        if !path.is_file() {
            return Err(eyre!("no such file: {}", path.display()));
        }
    }

    let update = ContributionUpdate {
        title: args.title.map(|t| t.trim().to_string()),
        file: args.file.as_deref().map(file_ref),
        tag_level1: args.doc_type,
        tag_level2: args.priority,
        tag_level3: args.tags,
    };
    check_update(&update, &seed::vocabulary()).map_err(|e| refused(&e, ctx.locale))?;

    let version = store.resubmit(&id, update)?.version;
    ctx.save(&store)?;
    println!("Resubmitted {id} as version {version}; awaiting review.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Explorer
// ---------------------------------------------------------------------------

fn cmd_explore(ctx: &Context, args: ExploreArgs) -> Result<()> {
    let catalog = ctx.catalog()?;
    let locale = ctx.locale;

    let mut nav = ExplorerNav::new();
    match (&args.topic, &args.department) {
        (Some(topic), dept) => {
            nav.select_topic(&catalog, topic, locale)?;
            if let Some(dept) = dept {
                if nav.department() != Some(dept.as_str()) {
                    return Err(eyre!("topic '{topic}' is not under department '{dept}'"));
                }
            }
        }
        (None, Some(dept)) => nav.select_department(&catalog, dept, locale)?,
        (None, None) => {}
    }

    if let Some(index) = args.crumb {
        let target = BreadcrumbTarget::from_index(index)
            .ok_or_else(|| eyre!("breadcrumb index must be -1 or greater, got {index}"))?;
        nav.navigate(target);
    }

    let filter = TaxonomyFilter::new(ctx.config.explorer.min_query_chars);
    let query = nav.query(args.search.unwrap_or_default(), args.status, args.doc_type);
    let outcome = filter.filter(&catalog.assets, &query);

    if args.json {
        println!("{}", serde_json::to_string_pretty(outcome.assets())?);
        return Ok(());
    }

    println!("  {}", breadcrumb_line(&nav, locale));
    println!();

    match outcome {
        FilterOutcome::PromptForSelection => println!("{}", prompt_text(locale)),
        FilterOutcome::NoMatches => println!("{}", no_matches_text(locale)),
        FilterOutcome::Matches(assets) => {
            for asset in &assets {
                let doc_type = catalog
                    .document_types
                    .iter()
                    .find(|t| t.id == asset.document_type)
                    .map_or(asset.document_type.as_str(), |t| t.name.get(locale));
                println!(
                    "  [{}] {}",
                    asset.status.label(locale),
                    asset.display_title(locale)
                );
                println!("      {doc_type} · {} · {}", asset.author, asset.date);
                if !asset.tags.is_empty() {
                    println!("      #{}", asset.tags.join(" #"));
                }
            }
            println!();
            println!("  {} item(s)", assets.len());
        }
    }
    Ok(())
}

fn cmd_tree(ctx: &Context, department: Option<&str>) -> Result<()> {
    let catalog = ctx.catalog()?;
    let locale = ctx.locale;

    let departments: Vec<_> = match department {
        Some(id) => vec![
            catalog
                .department(id)
                .ok_or_else(|| eyre!("department not found: {id}"))?,
        ],
        None => catalog.departments.iter().collect(),
    };

    for dept in departments {
        println!(
            "{} {} [{}] ({}) · {}",
            dept.icon,
            dept.name.get(locale),
            dept.id,
            dept.item_count,
            dept.owner
        );
        print_topics(&dept.topics, locale, 1);
    }
    Ok(())
}

fn print_topics(topics: &[Topic], locale: Locale, depth: usize) {
    for topic in topics {
        println!(
            "{}{} [{}] ({})",
            "  ".repeat(depth),
            topic.name.get(locale),
            topic.id,
            topic.item_count
        );
        print_topics(&topic.children, locale, depth + 1);
    }
}

fn cmd_vocab(ctx: &Context, kind: VocabKind) -> Result<()> {
    let vocab = seed::vocabulary();
    let locale = ctx.locale;
    match kind {
        VocabKind::DocTypes => {
            for tag in &vocab.document_types {
                println!("  {:<20} {}", tag.id, tag.name.get(locale));
            }
        }
        VocabKind::Priorities => {
            for tag in &vocab.priority_topics {
                println!("  {:<20} {}", tag.id, tag.name.get(locale));
            }
        }
        VocabKind::Topics => {
            for topic in &vocab.knowledge_topics {
                println!("  {:<24} {}", topic.id, topic.name.get(locale));
                for specific in &topic.specific_topics {
                    println!("      - {specific}");
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// File metadata for a local path. Only the name and location are recorded.
fn file_ref(path: &Path) -> FileRef {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    FileRef::new(name, path.display().to_string())
}

fn refused(errors: &ValidationErrors, locale: Locale) -> color_eyre::eyre::Report {
    eyre!("submission refused:\n  - {}", errors.messages(locale).join("\n  - "))
}

fn breadcrumb_line(nav: &ExplorerNav, locale: Locale) -> String {
    let root = match locale {
        Locale::En => "All departments",
        Locale::Id => "Semua departemen",
    };
    std::iter::once(root)
        .chain(nav.breadcrumbs().iter().map(|c| c.name.as_str()))
        .collect::<Vec<_>>()
        .join(" › ")
}

fn prompt_text(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Select a department or type a search to explore knowledge.",
        Locale::Id => "Pilih departemen atau ketik pencarian untuk menjelajahi pengetahuan.",
    }
}

fn no_matches_text(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "No knowledge assets match the current filters.",
        Locale::Id => "Tidak ada aset pengetahuan yang sesuai dengan filter.",
    }
}

fn print_contribution(c: &KnowledgeContribution, vocab: &Vocabulary, locale: Locale) {
    let doc_type = vocab
        .document_type(&c.tag_level1)
        .map_or(c.tag_level1.as_str(), |t| t.name.get(locale));

    println!("  {}  [{}]  v{}", c.id, c.status(), c.version);
    println!("    {}", c.title);
    println!("    file: {}  type: {doc_type}", c.file.name);
    if !c.tag_level2.is_empty() {
        println!("    priority: {}", c.tag_level2.join(", "));
    }
    if !c.tag_level3.is_empty() {
        println!("    topics: {}", c.tag_level3.join(", "));
    }
    println!(
        "    by {} <{}> on {}",
        c.contributor.name,
        c.contributor.email,
        c.submission_date.format("%Y-%m-%d %H:%M UTC")
    );
    if let (Some(name), Some(date)) = (c.reviewer_name(), c.review_date()) {
        println!("    reviewed by {name} on {}", date.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(reason) = c.rejection_reason() {
        println!("    reason: {reason}");
    }
    println!();
}
