use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mvpanel",
    about = "MediaVPN panel core: client configs, subscription links, catalog",
    version = crate::version::VERSION,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub config: Config,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Encode a client config (vmess/vless/trojan/clash/raw) for one endpoint.
    Generate(GenerateArgs),

    /// Build a subscription link for the panel API.
    SubLink(SubLinkArgs),

    /// List the proxy catalog as JSON, optionally filtered.
    Proxies(ProxiesArgs),

    /// Print dashboard statistics as JSON.
    Stats,

    /// Inspect or reset the settings store under --data-dir.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    #[arg(
        long,
        global = true,
        env = "MVPANEL_DATA_DIR",
        value_name = "PATH",
        default_value = "./data"
    )]
    pub data_dir: PathBuf,

    #[arg(
        long = "public-domain",
        global = true,
        env = "MVPANEL_PUBLIC_DOMAIN",
        value_name = "HOST",
        default_value = "your-domain.com"
    )]
    pub public_domain: String,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_name = "FORMAT")]
    pub format: String,

    #[arg(long, value_name = "HOST")]
    pub host: String,

    #[arg(
        long,
        value_name = "PORT",
        default_value_t = 443,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: u16,

    /// Display name; defaults to the generated identity's name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Identifier to embed; a fresh UUID is drawn when absent.
    #[arg(long, value_name = "UUID")]
    pub uuid: Option<String>,

    #[arg(long = "ws-path", value_name = "PATH")]
    pub ws_path: Option<String>,

    #[arg(long = "ws-host", value_name = "HOST")]
    pub ws_host: Option<String>,

    #[arg(long = "no-tls")]
    pub no_tls: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SubLinkArgs {
    #[arg(long, value_name = "FORMAT", default_value = "raw")]
    pub format: String,

    #[arg(long = "country", value_name = "CC")]
    pub countries: Vec<String>,

    #[arg(long = "protocol", value_name = "NAME")]
    pub protocols: Vec<String>,

    #[arg(
        long = "port",
        value_name = "PORT",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub ports: Vec<u16>,

    #[arg(
        long,
        value_name = "N",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..=1000)
    )]
    pub limit: u32,

    /// Overrides --public-domain for this link.
    #[arg(long, value_name = "HOST")]
    pub domain: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ProxiesArgs {
    #[arg(long, value_name = "CC")]
    pub country: Option<String>,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub protocol: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings as JSON, initializing the store if needed.
    Show,

    /// Restore the default settings.
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_flags_absent() {
        let cli = Cli::try_parse_from(["mvpanel", "stats"]).unwrap();
        assert_eq!(cli.config.data_dir, PathBuf::from("./data"));
        assert_eq!(cli.config.public_domain, "your-domain.com");
    }

    #[test]
    fn generate_defaults_port_to_443() {
        let cli = Cli::try_parse_from([
            "mvpanel", "generate", "--format", "vless", "--host", "example.com",
        ])
        .unwrap();
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.port, 443);
                assert!(args.uuid.is_none());
                assert!(!args.no_tls);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_port_zero() {
        let err = Cli::try_parse_from([
            "mvpanel", "generate", "--format", "vless", "--host", "h", "--port", "0",
        ])
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--port"));
    }

    #[test]
    fn sub_link_collects_repeated_list_flags() {
        let cli = Cli::try_parse_from([
            "mvpanel", "sub-link", "--format", "clash", "--country", "ID", "--country", "SG",
            "--protocol", "trojan", "--port", "443",
        ])
        .unwrap();
        match cli.command {
            Command::SubLink(args) => {
                assert_eq!(args.countries, vec!["ID", "SG"]);
                assert_eq!(args.protocols, vec!["trojan"]);
                assert_eq!(args.ports, vec![443]);
                assert_eq!(args.limit, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_limit() {
        let err =
            Cli::try_parse_from(["mvpanel", "sub-link", "--limit", "0"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--limit"));
        assert!(msg.contains("1..=1000"));
    }
}
