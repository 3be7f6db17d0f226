use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use votemap::loader::write_json;
use votemap::politigraph::{self, IngestOptions, PolitigraphClient};
use votemap::prelude::*;
use votemap::stats::fact_table;
use votemap::summary::sort_by_total_cast;

/// Province map statistics for parliamentary voting records
#[derive(Parser, Debug)]
#[command(name = "votemap")]
#[command(about = "Filter and aggregate parliamentary votes per province")]
#[command(version)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding person.json, fact.json and vote_detail.json
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Color policy: flat or gradient
    #[arg(long, global = true, value_parser = ["flat", "gradient"])]
    policy: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the distinct vote events
    Events,

    /// List members per province
    Provinces,

    /// Per-province stats and map colors for a filter selection
    Stats {
        /// Bill title to filter on
        #[arg(long)]
        event: Option<String>,

        /// Vote option label to filter on
        #[arg(long)]
        option: Option<String>,

        /// Aggregate from facts or from vote details
        #[arg(long, default_value = "facts", value_parser = ["facts", "details"])]
        source: String,
    },

    /// Member vote summaries, most active first
    Members {
        /// Only members of this province, read from the summary asset or the live API
        #[arg(long)]
        province: Option<String>,
    },

    /// Map legend for the current policy
    Legend {
        /// Vote option label
        #[arg(long)]
        option: Option<String>,
    },

    /// Download votes from Politigraph into a data directory
    Fetch {
        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },
}

fn print_available_commands() {
    println!("Available commands:");
    println!("  events     List the distinct vote events");
    println!("  provinces  List members per province");
    println!("  stats      Per-province stats and map colors");
    println!("  members    Member vote summaries");
    println!("  legend     Map legend for the current policy");
    println!("  fetch      Download votes from Politigraph");
}

fn config_builder(common: &CommonArgs) -> anyhow::Result<ConfigBuilder> {
    let mut builder = match &common.config {
        Some(path) => ConfigBuilder::from_file(path)?,
        None => ConfigBuilder::new("data"),
    };
    if let Some(dir) = &common.data_dir {
        builder = builder.data_dir(dir);
    }
    if let Some(policy) = &common.policy {
        builder = builder.color_policy_str(policy)?;
    }
    Ok(builder)
}

fn print_lines<T: Serialize>(items: impl IntoIterator<Item = T>) -> anyhow::Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(&item)?);
    }
    Ok(())
}

async fn run_stats_command(
    config: &Config,
    event: Option<String>,
    option: Option<String>,
    source: &str,
) -> anyhow::Result<()> {
    let dashboard = Dashboard::load(config).await?;
    let selection = Selection::new(event, option);
    let view = dashboard.filtered(&selection, source.parse()?);
    let mapper = ColorMapper::new(config.color_policy, config.opacity, &config.palette);
    print_lines(dashboard.province_views(&view, &mapper, &selection))
}

async fn run_members_command(config: &Config, province: Option<String>) -> anyhow::Result<()> {
    match province {
        Some(province) => {
            let summaries = ProvinceSummarySource::from_config(config).load(&province).await;
            print_lines(summaries)
        }
        None => {
            let dashboard = Dashboard::load(config).await?;
            let mut summaries = dashboard.member_summaries();
            sort_by_total_cast(&mut summaries);
            print_lines(summaries)
        }
    }
}

async fn run_fetch_command(config: &Config) -> anyhow::Result<()> {
    let endpoint = config
        .graphql_endpoint
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no GraphQL endpoint configured"))?;
    let client = PolitigraphClient::new(
        endpoint,
        IngestOptions {
            term: config.term,
            excluded_options: config.excluded_options.clone(),
        },
    );

    let people = client.fetch_people().await?;
    let records = politigraph::flatten_people(&people, client.options());
    let vote_details = politigraph::vote_details(&records);
    let mut summaries = politigraph::member_summaries(&records);
    sort_by_total_cast(&mut summaries);

    write_json(&config.person_path(), &politigraph::persons(&people)).await?;
    write_json(&config.vote_detail_path(), &vote_details).await?;
    write_json(&config.fact_path(), &fact_table(&vote_details)).await?;
    write_json(&config.data_dir.join("member_summary.json"), &summaries).await?;

    info!(
        "wrote {} vote records of {} people to {}",
        records.len(),
        people.len(),
        config.data_dir.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(command) = args.command else {
        print_available_commands();
        return Ok(());
    };

    let builder = config_builder(&args.common)?;
    match command {
        Command::Events => {
            let dashboard = Dashboard::load(&builder.build()?).await?;
            print_lines(dashboard.events())
        }
        Command::Provinces => {
            let dashboard = Dashboard::load(&builder.build()?).await?;
            for (province, members) in dashboard.groups() {
                let names: Vec<&str> = members.iter().map(|p| p.name.as_str()).collect();
                println!("{}", serde_json::json!({ "province": province, "members": names }));
            }
            Ok(())
        }
        Command::Stats {
            event,
            option,
            source,
        } => run_stats_command(&builder.build()?, event, option, &source).await,
        Command::Members { province } => run_members_command(&builder.build()?, province).await,
        Command::Legend { option } => {
            let config = builder.build_settings()?;
            let mapper = ColorMapper::new(config.color_policy, config.opacity, &config.palette);
            println!("{}", serde_json::to_string_pretty(&mapper.legend(option.as_deref()))?);
            Ok(())
        }
        Command::Fetch { out } => {
            std::fs::create_dir_all(&out)?;
            run_fetch_command(&builder.data_dir(out).build()?).await
        }
    }
}
