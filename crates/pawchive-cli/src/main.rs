//! `pawchive` command-line client

mod commands;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::{DraftEdits, Filter};
use config::PawchiveConfig;
use pawchive_model::{
    AdoptionRequest, ModelError, SponsorTier, SponsorshipRequest, StrayId, StrayStatus,
    VaccinationEntry,
};
use pawchive_roster::{Category, RosterError};
use pawchive_store::DataSource;
use std::convert::Infallible;
use std::path::PathBuf;

fn parse_category(raw: &str) -> Result<Category, RosterError> {
    raw.parse()
}

fn parse_status(raw: &str) -> Result<StrayStatus, Infallible> {
    raw.parse()
}

fn parse_tier(raw: &str) -> Result<SponsorTier, ModelError> {
    raw.parse()
}

/// JSON array of `{name, date, status}` objects
fn parse_vaccinations(raw: &str) -> Result<Vec<VaccinationEntry>, serde_json::Error> {
    serde_json::from_str(raw)
}

fn filter_args() -> [Arg; 2] {
    [
        Arg::new("query")
            .long("query")
            .short('q')
            .default_value("")
            .help("Case-insensitive match on name or location"),
        Arg::new("category")
            .long("category")
            .short('c')
            .default_value("all")
            .value_parser(parse_category)
            .help("all, available or under-care"),
    ]
}

/// Column flags shared by `add` and `edit`
fn field_args(name_required: bool) -> Vec<Arg> {
    vec![
        Arg::new("name").long("name").required(name_required),
        Arg::new("breed").long("breed"),
        Arg::new("gender").long("gender"),
        Arg::new("age").long("age"),
        Arg::new("weight").long("weight"),
        Arg::new("location").long("location"),
        Arg::new("status")
            .long("status")
            .value_parser(parse_status)
            .help("Available, Under Care, Adopted or any other tag"),
        Arg::new("rescue-date").long("rescue-date"),
        Arg::new("bio").long("bio").help("Story text; an empty value clears it"),
        Arg::new("vaccinations")
            .long("vaccinations")
            .value_parser(parse_vaccinations)
            .help(r#"JSON array, e.g. '[{"name":"Rabies","date":"2024-01-10","status":"Completed"}]'"#),
        Arg::new("photo")
            .long("photo")
            .value_parser(value_parser!(PathBuf))
            .help("Image file uploaded before the write"),
    ]
}

fn stray_id_arg() -> Arg {
    Arg::new("id").required(true).help("Stray id")
}

fn cli() -> Command {
    Command::new("pawchive")
        .version(pawchive_roster::VERSION)
        .about("Campus stray roster")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./pawchive.toml if present)"),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .global(true)
                .help("Backend URL, overrides config and environment"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("list")
                .about("Print the roster once")
                .args(filter_args())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print one stray's details")
                .arg(stray_id_arg()),
        )
        .subcommand(
            Command::new("watch")
                .about("Follow the roster live until Ctrl-C")
                .args(filter_args()),
        )
        .subcommand(
            Command::new("add")
                .about("Add a stray")
                .args(field_args(true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Update a stray; unset flags keep their stored values")
                .arg(stray_id_arg())
                .args(field_args(false)),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete strays")
                .arg(
                    Arg::new("ids")
                        .required(true)
                        .num_args(1..)
                        .help("Stray ids"),
                ),
        )
        .subcommand(
            Command::new("adopt")
                .about("Apply to adopt a stray")
                .arg(stray_id_arg())
                .arg(Arg::new("full-name").long("full-name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("phone").long("phone").required(true))
                .arg(Arg::new("address").long("address").required(true))
                .arg(Arg::new("reason").long("reason"))
                .arg(
                    Arg::new("has-experience")
                        .long("has-experience")
                        .action(ArgAction::SetTrue)
                        .help("Has kept pets before"),
                )
                .arg(
                    Arg::new("agree-terms")
                        .long("agree-terms")
                        .action(ArgAction::SetTrue)
                        .help("Accept the adoption terms"),
                ),
        )
        .subcommand(
            Command::new("sponsor")
                .about("Pledge a sponsorship for a stray")
                .arg(stray_id_arg())
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("tier")
                        .long("tier")
                        .value_parser(parse_tier)
                        .help("basic, gold or premium"),
                )
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .value_parser(value_parser!(u32))
                        .help("Custom amount, used when no tier is given"),
                ),
        )
}

fn filter_from(args: &ArgMatches) -> Filter {
    Filter {
        query: args.get_one::<String>("query").cloned().unwrap_or_default(),
        category: args.get_one::<Category>("category").copied().unwrap_or_default(),
    }
}

fn edits_from(args: &ArgMatches) -> DraftEdits {
    let text = |name: &str| args.get_one::<String>(name).cloned();
    DraftEdits {
        name: text("name"),
        breed: text("breed"),
        gender: text("gender"),
        age: text("age"),
        weight: text("weight"),
        location: text("location"),
        status: args.get_one::<StrayStatus>("status").cloned(),
        rescue_date: text("rescue-date"),
        bio: text("bio"),
        vaccinations: args.get_one::<Vec<VaccinationEntry>>("vaccinations").cloned(),
    }
}

fn stray_id(args: &ArgMatches) -> Result<StrayId> {
    args.get_one::<String>("id")
        .map(|id| StrayId::new(id.as_str()))
        .context("missing stray id")
}

fn adoption_from(args: &ArgMatches) -> Result<AdoptionRequest> {
    let text = |name: &str| args.get_one::<String>(name).cloned().unwrap_or_default();
    Ok(AdoptionRequest {
        stray_id: Some(stray_id(args)?),
        full_name: text("full-name"),
        email: text("email"),
        phone: text("phone"),
        address: text("address"),
        reason: text("reason"),
        has_experience: args.get_flag("has-experience"),
        agree_terms: args.get_flag("agree-terms"),
    })
}

fn sponsorship_from(args: &ArgMatches) -> Result<SponsorshipRequest> {
    let text = |name: &str| args.get_one::<String>(name).cloned().unwrap_or_default();
    Ok(SponsorshipRequest {
        stray_id: Some(stray_id(args)?),
        sponsor_name: text("name"),
        email: text("email"),
        tier: args.get_one::<SponsorTier>("tier").copied(),
        custom_amount: args.get_one::<u32>("amount").copied(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut config = PawchiveConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(url) = matches.get_one::<String>("url") {
        config.backend.url.clone_from(url);
    }
    if matches.get_flag("log-json") {
        config.log.json = true;
    }
    logging::init(&config.log)?;

    let (source, backend) =
        DataSource::rest(&config.backend).context("failed to set up backend client")?;
    tracing::debug!(url = %config.backend.url, collection = %config.roster.collection, "backend ready");

    match matches.subcommand() {
        Some(("list", args)) => {
            commands::list(&config, source, &filter_from(args), args.get_flag("json")).await
        }
        Some(("show", args)) => commands::show(&config, source, &stray_id(args)?).await,
        Some(("watch", args)) => commands::watch(&config, source, &filter_from(args)).await,
        Some(("add", args)) => {
            let photo = args.get_one::<PathBuf>("photo").map(PathBuf::as_path);
            commands::add(&config, &*backend, edits_from(args), photo)
                .await
                .map(drop)
        }
        Some(("edit", args)) => {
            let photo = args.get_one::<PathBuf>("photo").map(PathBuf::as_path);
            commands::edit(&config, &*backend, &stray_id(args)?, edits_from(args), photo)
                .await
                .map(drop)
        }
        Some(("remove", args)) => {
            let ids: Vec<StrayId> = args
                .get_many::<String>("ids")
                .into_iter()
                .flatten()
                .map(|id| StrayId::new(id.as_str()))
                .collect();
            commands::remove(&config, &*backend, &ids).await
        }
        Some(("adopt", args)) => commands::adopt(&config, source, &adoption_from(args)?).await,
        Some(("sponsor", args)) => {
            commands::sponsor(&config, source, &sponsorship_from(args)?).await
        }
        _ => Ok(()),
    }
}
