use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use mvpanel::catalog::{self, ProxyFilters};
use mvpanel::client_config;
use mvpanel::config::{Cli, Command, Config, GenerateArgs, ProxiesArgs, SettingsCommand, SubLinkArgs};
use mvpanel::domain::{ConnectionParams, Protocol, ProxyStatus};
use mvpanel::identity;
use mvpanel::settings::JsonSettingsStore;
use mvpanel::subscription::{self, SubscriptionSpec};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate(args),
        Command::SubLink(args) => sub_link(&cli.config, args),
        Command::Proxies(args) => proxies(args),
        Command::Stats => stats(),
        Command::Settings(cmd) => settings(&cli.config, cmd),
    }
}

fn generate(args: GenerateArgs) -> Result<()> {
    let (identifier, generated_name) = match args.uuid {
        Some(uuid) => (uuid, None),
        None => {
            let id = identity::generate_identity(&mut rand::rngs::OsRng)?;
            (id.identifier, Some(id.display_name))
        }
    };
    let display_name = args.name.or(generated_name).unwrap_or_default();

    let mut params = ConnectionParams::new(args.host, args.port, identifier, display_name);
    params.transport.path = args.ws_path;
    params.transport.host_header = args.ws_host;
    params.tls = !args.no_tls;

    let encoded = client_config::build_config(&args.format, &params)?;
    info!(format = encoded.format.as_str(), host = %params.host, "generated client config");
    println!("{}", encoded.content);
    Ok(())
}

fn sub_link(config: &Config, args: SubLinkArgs) -> Result<()> {
    let format = client_config::ConfigFormat::parse(&args.format)
        .ok_or_else(|| anyhow::anyhow!("unknown config format: {}", args.format))?;
    let protocols = args
        .protocols
        .iter()
        .map(|p| {
            Protocol::parse(p).ok_or_else(|| anyhow::anyhow!("unknown protocol: {p}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let spec = SubscriptionSpec {
        format,
        countries: args.countries,
        protocols,
        ports: args.ports,
        limit: args.limit,
        domain: args.domain.unwrap_or_else(|| config.public_domain.clone()),
    };

    let url = subscription::build_subscription_url(&spec)?;
    let record = subscription::new_subscription(&spec, chrono::Utc::now());
    let out = serde_json::json!({ "url": url, "subscription": record });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn proxies(args: ProxiesArgs) -> Result<()> {
    let status = args
        .status
        .as_deref()
        .map(|s| ProxyStatus::parse(s).ok_or_else(|| anyhow::anyhow!("unknown status: {s}")))
        .transpose()?;
    let protocol = args
        .protocol
        .as_deref()
        .map(|p| Protocol::parse(p).ok_or_else(|| anyhow::anyhow!("unknown protocol: {p}")))
        .transpose()?;

    let filters = ProxyFilters {
        country: args.country,
        status,
        protocol,
        search: args.search,
    };
    let list = catalog::filter_proxies(&catalog::sample_proxies(), &filters);
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

fn stats() -> Result<()> {
    let stats = catalog::dashboard_stats(&catalog::sample_proxies(), &mut rand::rngs::OsRng);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn settings(config: &Config, cmd: SettingsCommand) -> Result<()> {
    let mut store = JsonSettingsStore::load_or_init(&config.data_dir)?;
    match cmd {
        SettingsCommand::Show => {}
        SettingsCommand::Reset => {
            store.reset()?;
            info!(data_dir = %config.data_dir.display(), "settings reset to defaults");
        }
    }
    println!("{}", serde_json::to_string_pretty(store.settings())?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).compact().init();
}
