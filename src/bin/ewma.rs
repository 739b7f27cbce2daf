extern crate rdt_sim;
use rdt_sim::ewma;

extern crate clap;
use clap::{App, Arg};

extern crate failure;

fn run() -> Result<(), failure::Error> {
    let matches = App::new("ewma")
        .about("Show how the EWMA gain smooths a step change in RTT")
        .arg(Arg::with_name("alpha")
            .long("alpha")
            .takes_value(true)
            .multiple(true)
            .use_delimiter(true)
            .default_value("1,0.1,0.05,0.01"))
        .arg(Arg::with_name("samples").long("samples").takes_value(true).default_value("100"))
        .get_matches();

    let samples = matches.value_of("samples").unwrap_or("100").parse::<usize>()?;
    let trace = ewma::step_trace(samples);
    for alpha in matches.values_of("alpha").into_iter().flat_map(|v| v) {
        let alpha = alpha.parse::<f64>()?;
        let smooth = ewma::smooth(&trace, alpha, 1.0)?;
        for &step in &[75, 90] {
            if let Some(rtt) = smooth.get(step) {
                println!("alpha {} step {}: rtt {}", alpha, step, rtt);
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
