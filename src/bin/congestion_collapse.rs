use std::fs::File;

extern crate rdt_sim;
use rdt_sim::host::{Host, AimdHost, SlidingWindowHost, StopAndWaitHost};
use rdt_sim::network::{Network, NetworkConfig, RunSummary};
use rdt_sim::timeout::{TimeoutBounds, MAX_TIMEOUT, MIN_TIMEOUT};

extern crate clap;
use clap::{App, Arg, ArgMatches};

#[macro_use] extern crate failure;
extern crate itertools;
use itertools::Itertools;

#[macro_use] extern crate slog;
extern crate slog_bunyan;
extern crate slog_term;

/// Terminal logger, optionally duplicated to a bunyan JSON trace file.
fn make_logger(trace: Option<&str>, level: slog::Level) -> Result<slog::Logger, failure::Error> {
    use std::sync::Mutex;
    use slog::Drain;

    let decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::CompactFormat::new(decorator).build();
    let term_drain = Mutex::new(term_drain).filter_level(level).fuse();

    match trace {
        Some(filename) => {
            let f = File::create(filename)?;
            let json_drain = Mutex::new(slog_bunyan::default(f)).fuse();
            Ok(slog::Logger::root(slog::Duplicate::new(
                json_drain,
                term_drain,
            ).fuse(), o!()))
        }
        None => Ok(slog::Logger::root(term_drain, o!())),
    }
}

fn parse<T>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error>
    where T: std::str::FromStr, T::Err: std::fmt::Display
{
    let raw = matches.value_of(name).ok_or_else(|| format_err!("missing --{}", name))?;
    raw.parse::<T>().map_err(|e| format_err!("bad --{} {:?}: {}", name, raw, e))
}

fn parse_windows(raw: &str) -> Result<Vec<usize>, failure::Error> {
    let windows = raw
        .split(',')
        .map(|w| w.trim().parse::<usize>().map_err(|e| format_err!("bad window {:?}: {}", w, e)))
        .collect::<Result<Vec<usize>, failure::Error>>()?;
    ensure!(!windows.is_empty(), "no window sizes given");
    ensure!(windows.iter().all(|&w| w > 0), "window sizes must be positive");
    ensure!(
        windows.iter().tuple_windows().all(|(a, b)| a <= b),
        "window sizes must be non-decreasing: {}", windows.iter().join(",")
    );
    Ok(windows)
}

fn run_one(
    host: &mut dyn Host,
    config: NetworkConfig,
    ticks: u64,
    logger: &slog::Logger,
) -> Result<RunSummary, failure::Error> {
    let mut net = Network::new(config, logger.clone())?;
    net.run(host, ticks)
}

fn run() -> Result<(), failure::Error> {
    let min_timeout = MIN_TIMEOUT.to_string();
    let max_timeout = MAX_TIMEOUT.to_string();
    let matches = App::new("congestion_collapse")
        .about("Compare reliable-delivery hosts over a simulated bottleneck")
        .arg(Arg::with_name("protocol")
            .long("protocol")
            .takes_value(true)
            .possible_values(&["sliding-window", "stop-and-wait", "aimd"])
            .default_value("sliding-window"))
        .arg(Arg::with_name("windows")
            .long("windows")
            .takes_value(true)
            .default_value("1,2,4,8,16,32,64,70,80,90,100")
            .help("Comma separated, non-decreasing window sizes (sliding-window only)"))
        .arg(Arg::with_name("ticks").long("ticks").takes_value(true).default_value("10000"))
        .arg(Arg::with_name("loss").long("loss").takes_value(true).default_value("0.0"))
        .arg(Arg::with_name("queue-limit").long("queue-limit").takes_value(true).default_value("1000000"))
        .arg(Arg::with_name("delay").long("delay").takes_value(true).default_value("10"))
        .arg(Arg::with_name("service-rate").long("service-rate").takes_value(true).default_value("1"))
        .arg(Arg::with_name("seed").long("seed").takes_value(true).default_value("1000"))
        .arg(Arg::with_name("min-timeout").long("min-timeout").takes_value(true).default_value(&min_timeout))
        .arg(Arg::with_name("max-timeout").long("max-timeout").takes_value(true).default_value(&max_timeout))
        .arg(Arg::with_name("trace")
            .long("trace")
            .takes_value(true)
            .help("Write a JSON event trace to this file"))
        .arg(Arg::with_name("verbose").short("v").multiple(true))
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => slog::Level::Info,
        _ => slog::Level::Debug,
    };
    let logger = make_logger(matches.value_of("trace"), level)?;

    let config = NetworkConfig{
        loss_ratio: parse(&matches, "loss")?,
        queue_limit: parse(&matches, "queue-limit")?,
        propagation_delay: parse(&matches, "delay")?,
        service_rate: parse(&matches, "service-rate")?,
        seed: parse(&matches, "seed")?,
    };
    config.validate()?;
    let bounds = TimeoutBounds::new(parse(&matches, "min-timeout")?, parse(&matches, "max-timeout")?)?;
    let ticks: u64 = parse(&matches, "ticks")?;

    match matches.value_of("protocol") {
        Some("stop-and-wait") => {
            let mut h = StopAndWaitHost::new(bounds, logger.new(o!("host" => "stop-and-wait")));
            let s = run_one(&mut h, config, ticks, &logger)?;
            println!("stop-and-wait in_order_rx_seq={} sent={} retx={}", s.in_order_rx_seq, s.sent, s.retransmitted);
        }
        Some("aimd") => {
            let mut h = AimdHost::new(bounds, logger.new(o!("host" => "aimd")));
            let s = run_one(&mut h, config, ticks, &logger)?;
            println!(
                "aimd in_order_rx_seq={} sent={} retx={} window={:.2}",
                s.in_order_rx_seq, s.sent, s.retransmitted, h.window(),
            );
        }
        _ => {
            let windows = parse_windows(matches.value_of("windows").unwrap_or(""))?;
            println!("window,in_order_rx_seq,sent,retransmitted");
            for window in windows {
                let mut h = SlidingWindowHost::new(window, bounds, logger.new(o!("window" => window)))?;
                let s = run_one(&mut h, config, ticks, &logger)?;
                println!("{},{},{},{}", window, s.in_order_rx_seq, s.sent, s.retransmitted);
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
