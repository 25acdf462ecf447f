use std::error::Error;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{Actor, Engine, PollStatus, Resource};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "credit_ledger_admin")]
#[command(about = "Admin utilities for the credit ledger (provision teams, catalog and polls)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./credit_ledger.db?mode=rwc"
    )]
    database_url: String,

    /// Admin id recorded as the acting admin.
    #[arg(long, env = "CREDIT_LEDGER_ADMIN_ID", default_value_t = 1)]
    admin_id: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Team(Team),
    Resource(ResourceCmd),
    Poll(Poll),
    Composition(Composition),
}

#[derive(Args, Debug)]
struct Team {
    #[command(subcommand)]
    command: TeamCommand,
}

#[derive(Subcommand, Debug)]
enum TeamCommand {
    Create(TeamCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct TeamCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Starting credit; the ledger default when omitted.
    #[arg(long)]
    credit: Option<i64>,
}

#[derive(Args, Debug)]
struct ResourceCmd {
    #[command(subcommand)]
    command: ResourceCommand,
}

#[derive(Subcommand, Debug)]
enum ResourceCommand {
    Create(ResourceCreateArgs),
}

#[derive(Args, Debug)]
struct ResourceCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    cost: i64,
    /// Units in stock.
    #[arg(long)]
    quantity: i64,
    #[arg(long)]
    max_per_team: i64,
    #[arg(long = "type")]
    kind: String,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    non_returnable: bool,
}

#[derive(Args, Debug)]
struct Poll {
    #[command(subcommand)]
    command: PollCommand,
}

#[derive(Subcommand, Debug)]
enum PollCommand {
    Create(PollCreateArgs),
    Status(PollStatusArgs),
}

#[derive(Args, Debug)]
struct PollCreateArgs {
    #[arg(long)]
    question: String,
    /// Repeat once per option.
    #[arg(long = "option", required = true)]
    options: Vec<String>,
    /// RFC 3339 timestamp; now when omitted.
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// RFC 3339 timestamp.
    #[arg(long)]
    end: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PollStatusArg {
    Open,
    Closed,
}

#[derive(Args, Debug)]
struct PollStatusArgs {
    #[arg(long)]
    id: i64,
    #[arg(long, value_enum)]
    status: PollStatusArg,
}

#[derive(Args, Debug)]
struct Composition {
    #[command(subcommand)]
    command: CompositionCommand,
}

#[derive(Subcommand, Debug)]
enum CompositionCommand {
    Create(CompositionCreateArgs),
}

#[derive(Args, Debug)]
struct CompositionCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value_t = 0)]
    dev: i32,
    #[arg(long, default_value_t = 0)]
    infra: i32,
    #[arg(long, default_value_t = 0)]
    data: i32,
    #[arg(long, default_value_t = 0)]
    iot: i32,
    #[arg(long, default_value_t = 0)]
    sysemb: i32,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;
    let admin = Actor::Admin {
        admin_id: cli.admin_id,
    };

    match cli.command {
        Command::Team(Team {
            command: TeamCommand::Create(args),
        }) => {
            let team = engine
                .new_team(&admin, &args.name, &args.email, args.credit)
                .await?;
            println!("created team: {} ({}) credit {}", team.name, team.id, team.credit);
        }
        Command::Team(Team {
            command: TeamCommand::List,
        }) => {
            for team in engine.teams(&admin).await? {
                println!("{}\t{}\t{}\t{}", team.id, team.name, team.email, team.credit);
            }
        }
        Command::Resource(ResourceCmd {
            command: ResourceCommand::Create(args),
        }) => {
            let mut resource = Resource::new(
                args.name,
                args.cost,
                args.quantity,
                args.max_per_team,
                args.kind,
            )?;
            resource.description = args.description;
            resource.image_url = args.image_url;
            resource.is_non_returnable = args.non_returnable;

            let resource = engine.new_resource(&admin, resource).await?;
            println!("created resource: {} ({})", resource.name, resource.id);
        }
        Command::Poll(Poll {
            command: PollCommand::Create(args),
        }) => {
            let start = args.start.unwrap_or_else(Utc::now);
            let poll = engine
                .new_poll(&admin, &args.question, args.options, start, args.end)
                .await?;
            println!("created poll: {} ({})", poll.question, poll.id);
        }
        Command::Poll(Poll {
            command: PollCommand::Status(args),
        }) => {
            let status = match args.status {
                PollStatusArg::Open => PollStatus::Open,
                PollStatusArg::Closed => PollStatus::Closed,
            };
            let poll = engine.set_poll_status(&admin, args.id, status).await?;
            println!("poll {} is now {}", poll.id, poll.status.as_str());
        }
        Command::Composition(Composition {
            command: CompositionCommand::Create(args),
        }) => {
            let totals = [args.dev, args.infra, args.data, args.iot, args.sysemb];
            let composition = engine
                .new_team_composition(&admin, &args.name, totals)
                .await?;
            println!(
                "created team composition: {} ({})",
                composition.name, composition.id
            );
        }
    }

    Ok(())
}
