use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use healthdesk::availability::{self, AvailabilityEvent};
use healthdesk::calendar;
use healthdesk::config::{DashboardConfig, APP_NAME, APP_VERSION};
use healthdesk::models::{Appointment, StatusFilter};
use healthdesk::notifications::{Audience, NotificationCenter};
use healthdesk::provider::{self, AppointmentProvider, InMemoryProvider, JsonFileProvider};
use healthdesk::render;
use healthdesk::seed;
use healthdesk::store::JsonFileStore;
use healthdesk::tickets::{NewTicket, Role, TicketBoard, TicketPriority, TicketStatus};

#[derive(Parser)]
#[command(name = "healthdesk")]
#[command(
    about = "Appointment calendar and dashboard tools for doctors, facilities and admins",
    long_about = None
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct CalendarArgs {
    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Appointment file (JSON array); the demo data set is used otherwise
    #[arg(long)]
    data: Option<PathBuf>,
    /// Status filter: all, pending, confirmed, completed, cancelled
    #[arg(long, default_value = "all")]
    status: StatusFilter,
    /// Facility whose operating hours define the grid
    #[arg(long)]
    facility: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hourly grid for the Monday-start week containing the date
    Week(CalendarArgs),
    /// Hourly grid for a single day
    Day(CalendarArgs),
    /// Week list view grouped by day
    List(CalendarArgs),
    /// Write the demo appointments as JSON
    Seed {
        #[arg(long, default_value = "appointments.json")]
        out: PathBuf,
    },
    /// List support tickets
    Tickets {
        #[arg(long)]
        status: Option<TicketStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Open a support ticket
    TicketOpen {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        requester: String,
        #[arg(long, default_value = "doctor")]
        role: Role,
        #[arg(long, default_value = "medium")]
        priority: TicketPriority,
    },
    /// Reply to a support ticket
    TicketReply {
        #[arg(long)]
        id: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        body: String,
    },
    /// Change a support ticket's status
    TicketStatus {
        #[arg(long)]
        id: String,
        #[arg(long)]
        status: TicketStatus,
    },
    /// Broadcast a notification
    Notify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "everyone")]
        audience: Audience,
    },
    /// Show notifications for a role
    Inbox {
        #[arg(long)]
        role: Role,
        #[arg(long)]
        user: String,
        /// Mark everything shown as read
        #[arg(long)]
        mark_read: bool,
    },
    /// Show or change a doctor's availability
    Availability {
        #[arg(long)]
        doctor: String,
        #[command(subcommand)]
        action: Option<AvailabilityAction>,
    },
}

#[derive(Subcommand)]
enum AvailabilityAction {
    Online {
        /// Window length in minutes (defaults to the configured value)
        #[arg(long)]
        minutes: Option<i64>,
    },
    Offline,
    Status,
}

fn load_appointments(data: Option<&PathBuf>) -> anyhow::Result<Vec<Appointment>> {
    let appointments = match data {
        Some(path) => JsonFileProvider::new(path)
            .appointments()
            .with_context(|| format!("failed to load appointments from {}", path.display()))?,
        None => InMemoryProvider::new(seed::demo_appointments()).appointments()?,
    };
    Ok(appointments)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();
    tracing::debug!("{} v{} starting", APP_NAME, APP_VERSION);

    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Week(args) => {
            let appointments = load_appointments(args.data.as_ref())?;
            let slots = config.slots_for(args.facility.as_deref())?;
            let reference = args.date.unwrap_or(today);
            let grid = calendar::week_grid(&appointments, reference, &slots, args.status);
            let counts = calendar::status_counts(&appointments, &grid.dates());
            print!("{}", render::week_grid(&grid, &counts));
        }
        Commands::Day(args) => {
            let appointments = load_appointments(args.data.as_ref())?;
            let slots = config.slots_for(args.facility.as_deref())?;
            let date = args.date.unwrap_or(today);
            let view = calendar::day_view(&appointments, date, &slots, args.status);
            print!("{}", render::day_view(&view));
        }
        Commands::List(args) => {
            let appointments = load_appointments(args.data.as_ref())?;
            let window = calendar::week_window(args.date.unwrap_or(today));
            let groups = calendar::list_by_week(&appointments, &window, args.status);
            print!("{}", render::week_list(&groups));
        }
        Commands::Seed { out } => {
            let appointments = seed::demo_appointments();
            provider::write_records(&out, &appointments)?;
            println!("Wrote {} appointments to {}.", appointments.len(), out.display());
        }
        Commands::Tickets { status, search } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let board = TicketBoard::new(&store);
            let mut tickets = match search {
                Some(text) => board.search(&text)?,
                None => board.list(None)?,
            };
            if let Some(status) = status {
                tickets.retain(|t| t.status == status);
            }
            print!("{}", render::tickets(&tickets));
        }
        Commands::TicketOpen {
            subject,
            description,
            requester,
            role,
            priority,
        } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let ticket = TicketBoard::new(&store).open(
                NewTicket {
                    subject,
                    description,
                    requester,
                    role,
                    priority,
                },
                Utc::now(),
            )?;
            println!("Opened ticket {}.", ticket.id);
        }
        Commands::TicketReply { id, author, body } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let ticket = TicketBoard::new(&store).reply(&id, &author, &body, Utc::now())?;
            println!("Ticket {} now has {} replies.", ticket.id, ticket.replies.len());
        }
        Commands::TicketStatus { id, status } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let ticket = TicketBoard::new(&store).set_status(&id, status)?;
            println!("Ticket {} is now {}.", ticket.id, ticket.status);
        }
        Commands::Notify {
            title,
            body,
            audience,
        } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let sent =
                NotificationCenter::new(&store).broadcast(&title, &body, audience, Utc::now())?;
            println!("Sent notification {}.", sent.id);
        }
        Commands::Inbox {
            role,
            user,
            mark_read,
        } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let center = NotificationCenter::new(&store);
            let inbox = center.inbox(role)?;
            print!("{}", render::inbox(&inbox, &user));
            if mark_read {
                for notification in &inbox {
                    center.mark_read(&notification.id, &user)?;
                }
            }
        }
        Commands::Availability { doctor, action } => {
            let store = JsonFileStore::open(&config.data_dir)?;
            let now = Utc::now();
            let state = match action.unwrap_or(AvailabilityAction::Status) {
                AvailabilityAction::Online { minutes } => {
                    let minutes = minutes.unwrap_or(config.availability_minutes);
                    let event = AvailabilityEvent::go_online_minutes(minutes)?;
                    availability::apply(&store, &doctor, event, now)?
                }
                AvailabilityAction::Offline => {
                    availability::apply(&store, &doctor, AvailabilityEvent::GoOffline, now)?
                }
                AvailabilityAction::Status => availability::load(&store, &doctor, now)?,
            };
            println!("{}", render::availability(&doctor, &state, now));
        }
    }

    Ok(())
}
