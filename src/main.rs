use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cohort_view::actions::{ActionOutcome, CohortActions};
use cohort_view::config::ViewConfig;
use cohort_view::{
    report, store, AuthenticatedUser, BulkAction, CohortView, FilterCriteria, Landing, RiskLevel,
    Role, Session, SortDirection, SortField, SortSpec, StudentRecord,
};

#[derive(Parser)]
#[command(name = "cohort-view")]
#[command(about = "Filter, sort, page and summarize student performance records", long_about = None)]
struct Cli {
    /// CSV or JSON file of student records; the built-in sample cohort when omitted
    #[arg(long, global = true)]
    records: Option<PathBuf>,
    /// JSON view settings (page size, default sort, export directory)
    #[arg(long, global = true, env = "COHORT_VIEW_CONFIG")]
    config: Option<PathBuf>,
    /// Login response body to open the session from; a local admin session when omitted
    #[arg(long, global = true, env = "COHORT_VIEW_LOGIN")]
    login: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct QueryArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    risk: Option<RiskLevel>,
    /// Closed GPA interval such as 3.0-3.5
    #[arg(long)]
    gpa_range: Option<String>,
    #[arg(long)]
    academic_year: Option<String>,
    #[arg(long)]
    sort: Option<SortField>,
    #[arg(long)]
    dir: Option<SortDirection>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    page_size: Option<usize>,
}

impl QueryArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            department: self.department.clone(),
            risk_level: self.risk,
            gpa_range: self.gpa_range.clone(),
            academic_year: self.academic_year.clone(),
            search_term: self.search.clone(),
        }
    }

    fn sort_spec(&self, config: &ViewConfig) -> SortSpec {
        match (self.sort, self.dir) {
            (Some(field), dir) => SortSpec::new(field, dir.unwrap_or_default()),
            (None, Some(dir)) => SortSpec::new(config.default_sort.field, dir),
            (None, None) => config.default_sort,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample cohort to a CSV or JSON file
    Sample {
        #[arg(long, default_value = "cohort.csv")]
        out: PathBuf,
    },
    /// Show one page of the filtered, sorted cohort
    View {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print headline metrics and the risk mix for the filtered cohort
    Summary {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Generate a markdown report for the current page
    Report {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Run a bulk action over students on the visible page
    Bulk {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long)]
        action: BulkAction,
        /// Ids to mark; every id on the page when omitted
        #[arg(long = "id")]
        ids: Vec<String>,
    },
    /// Show the signed-in student's own record
    Me,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_session(login: Option<&Path>) -> anyhow::Result<Session> {
    match login {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read login response {}", path.display()))?;
            Session::from_login_response(&body).context("login response is not valid")
        }
        None => Ok(Session::new(AuthenticatedUser {
            id: "local".to_string(),
            full_name: "Local Administrator".to_string(),
            email: "admin@localhost".to_string(),
            role: Role::Admin,
        })),
    }
}

fn load_records(path: Option<&Path>) -> anyhow::Result<Vec<StudentRecord>> {
    match path {
        Some(path) => store::load_records(path)
            .with_context(|| format!("failed to load records from {}", path.display())),
        None => Ok(store::sample_cohort()),
    }
}

fn open_view(
    session: &Session,
    records: Vec<StudentRecord>,
    config: &ViewConfig,
    query: &QueryArgs,
) -> anyhow::Result<CohortView> {
    let mut config = config.clone();
    if let Some(page_size) = query.page_size {
        config.page_size = page_size;
    }

    let mut view = CohortView::open(session, records, &config)?;
    view.set_sort(query.sort_spec(&config));
    view.set_criteria(query.criteria());
    view.go_to_page(query.page);
    Ok(view)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ViewConfig> {
    ViewConfig::load(path).context("failed to load view config")
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    run(Cli::parse())
}

/// Each command loads only the config, session and records it reads.
fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    let login_path = cli.login.as_deref();
    let records_path = cli.records.as_deref();

    match cli.command {
        Commands::Sample { out } => {
            let sample = store::sample_cohort();
            if out.extension().is_some_and(|ext| ext == "json") {
                store::write_json(&out, &sample)?;
            } else {
                store::write_csv(&out, &sample)?;
            }
            println!("Wrote {} sample students to {}.", sample.len(), out.display());
        }
        Commands::View { query } => {
            let config = load_config(config_path)?;
            let session = load_session(login_path)?;
            let view = open_view(&session, load_records(records_path)?, &config, &query)?;
            let snapshot = view.render();

            if snapshot.rows.is_empty() {
                println!("No students match these filters.");
                return Ok(());
            }

            println!(
                "Page {} of {} ({} of {} students)",
                snapshot.page_number,
                snapshot.total_pages,
                snapshot.filtered_count,
                snapshot.total_records
            );
            for record in &snapshot.rows {
                println!(
                    "- {} ({}, {}) GPA {:.2} {} {} risk {}",
                    record.name,
                    record.student_id,
                    record.department,
                    record.gpa,
                    record.trend_direction().arrow(),
                    record.signed_trend(),
                    record.risk_level
                );
            }
            println!("{}", snapshot.range_label);
        }
        Commands::Summary { query } => {
            let config = load_config(config_path)?;
            let session = load_session(login_path)?;
            let view = open_view(&session, load_records(records_path)?, &config, &query)?;
            let snapshot = view.render();
            let metrics = snapshot.metrics;

            println!("Students: {}", metrics.total_count);
            println!("Average GPA: {:.2}", metrics.average_gpa);
            println!("High risk: {}", metrics.high_risk_count);
            println!("Improving: {}%", metrics.improving_percentage);
            for share in &snapshot.risk_distribution {
                println!("- {}: {} ({}%)", share.level, share.count, share.percentage);
            }
        }
        Commands::Report { query, out } => {
            let config = load_config(config_path)?;
            let session = load_session(login_path)?;
            let view = open_view(&session, load_records(records_path)?, &config, &query)?;
            let report = report::build_report(&view.render(), view.criteria(), view.sort_spec());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Bulk { query, action, ids } => {
            let config = load_config(config_path)?;
            let session = load_session(login_path)?;
            let mut view = open_view(&session, load_records(records_path)?, &config, &query)?;
            if ids.is_empty() {
                view.select_all(true);
            } else {
                let page_ids = view.render().row_ids();
                for id in &ids {
                    if !page_ids.contains(id) {
                        tracing::warn!(student = %id, "id is not on the visible page");
                    }
                    view.toggle_selection(id, true);
                }
            }

            let mut actions = CohortActions::new(view.records(), config.export_dir());
            view.dispatch(action, &mut actions);

            for outcome in actions.outcomes() {
                match outcome {
                    ActionOutcome::Exported { path, count } => {
                        println!("Exported {count} students to {}.", path.display())
                    }
                    ActionOutcome::Notified { count } => println!("Queued {count} notifications."),
                    ActionOutcome::InterventionScheduled { count } => {
                        println!("Scheduled {count} interventions.")
                    }
                    ActionOutcome::Failed { action, reason } => {
                        anyhow::bail!("{action} failed: {reason}")
                    }
                }
            }
        }
        Commands::Me => {
            let session = load_session(login_path)?;
            if session.landing() == Landing::CohortView {
                println!(
                    "{} is an administrator; use `cohort-view view` for the cohort.",
                    session.user.full_name
                );
                return Ok(());
            }
            let records = load_records(records_path)?;
            let Some(record) = store::find_own_record(&records, &session.user) else {
                println!("No record found for {}.", session.user.email);
                return Ok(());
            };
            println!("{} ({})", record.name, record.student_id);
            println!("GPA {:.2} {} {}", record.gpa, record.trend_direction().arrow(), record.signed_trend());
            println!("Risk level: {}", record.risk_level);
            if let Some(activity) = &record.last_activity {
                println!("Last activity: {activity}");
            }
        }
    }

    Ok(())
}
