use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use mimic_runtime::{
    parse_mtu, parse_pacing, Dispatcher, Identity, InterfaceConfig, ResponderConfig, Variant,
    DEFAULT_MTU,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn interface_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("name")
            .short("n")
            .long("name")
            .value_name("IFACE")
            .help("Name of the interface to create")
            .takes_value(true)
            .required(true),
        Arg::with_name("ip")
            .long("ip")
            .value_name("ADDR")
            .help("IPv4 address assigned to the interface")
            .takes_value(true)
            .required(true),
        Arg::with_name("prefix")
            .long("prefix")
            .value_name("LEN")
            .help("Prefix length of the interface address")
            .takes_value(true)
            .default_value("24"),
        Arg::with_name("pace-ms")
            .long("pace-ms")
            .value_name("MILLIS")
            .help("Minimum time between two frames, 0 disables pacing")
            .takes_value(true)
            .default_value("100"),
        Arg::with_name("mtu")
            .long("mtu")
            .value_name("BYTES")
            .help("Interface MTU")
            .takes_value(true),
    ]
}

fn app() -> App<'static, 'static> {
    App::new("mimic")
        .version("0.1.0")
        .about("Answers ARP and ping on a TUN/TAP interface as a host that does not exist")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("tap")
                .about("Ethernet frames: answers ARP requests and pings")
                .args(&interface_args())
                .arg(
                    Arg::with_name("fake-mac")
                        .long("fake-mac")
                        .alias("fake_mac")
                        .value_name("MAC")
                        .help("Hardware address to answer with")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("fake-ip")
                        .long("fake-ip")
                        .alias("fake_ip")
                        .value_name("ADDR")
                        .help("IPv4 address to claim in ARP replies")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("tun")
                .about("Bare IPv4 packets: answers pings")
                .args(&interface_args()),
        )
}

// clap has already rejected missing required arguments.
fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

fn config(matches: &ArgMatches) -> Result<ResponderConfig> {
    let (variant, sub) = match matches.subcommand() {
        ("tap", Some(sub)) => {
            let identity = Identity::parse(value(sub, "fake-mac"), value(sub, "fake-ip"))
                .context("invalid identity to impersonate")?;
            (Variant::Tap(identity), sub)
        }
        ("tun", Some(sub)) => (Variant::Tun, sub),
        (other, _) => anyhow::bail!("unknown subcommand {:?}", other),
    };

    let interface =
        InterfaceConfig::parse(value(sub, "name"), value(sub, "ip"), value(sub, "prefix"))
            .context("invalid interface configuration")?;
    let pacing = parse_pacing(value(sub, "pace-ms"))?;
    let mtu = match sub.value_of("mtu") {
        Some(mtu) => parse_mtu(mtu)?,
        None => DEFAULT_MTU,
    };

    Ok(ResponderConfig::new(interface, variant)
        .with_pacing(pacing)
        .with_mtu(mtu))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config(&app().get_matches())?;

    let (input, output) = mimic_tuntap::open(&config)
        .with_context(|| format!("failed to set up interface {}", config.interface.name))?;

    match config.variant.identity() {
        Some(identity) => info!(
            hardware_addr = %identity.hardware_addr,
            protocol_addr = %identity.protocol_addr,
            "answering ARP and ping"
        ),
        None => info!("answering ping"),
    }

    Dispatcher::from_config(input, output, &config).run()
}
