use clap::{crate_version, App, Arg, ArgMatches};
use console::{style, Term};
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};
use torque_ipol::report::{preview, render};
use torque_ipol::{is_quit, load_series, parse_time, question, Config, IpolError, PreparedSeries};

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("torque_ipol")
        .version(crate_version!())
        .about("Look up (interpolated) torque values at an arbitrary time in a recorded time series.")
        .arg(
            Arg::with_name("input")
                .help("xlsx, CSV or TSV file with a time column and one or more torque columns")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("time")
                .short("t")
                .long("time")
                .value_name("SECONDS")
                .help("Query time, repeat for several times; starts an interactive prompt when omitted")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::with_name("preview")
                .long("preview")
                .value_name("ROWS")
                .help("Print the column names and the first rows of the data")
                .takes_value(true)
                .min_values(0),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Print results as JSON"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("time_column")
                .long("time-column")
                .value_name("NAME")
                .help("Name of the time column [default: time_s]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("keyword")
                .short("k")
                .long("keyword")
                .value_name("WORD")
                .help("Columns containing this word are interpolated [default: torque]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("unit")
                .long("unit")
                .value_name("UNIT")
                .help("Unit printed after each value [default: Nm]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("precision")
                .short("p")
                .long("precision")
                .value_name("N")
                .help("Number of decimals [default: 2]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("delimiter")
                .short("d")
                .long("delimiter")
                .value_name("CHAR")
                .help("Field delimiter [default: guessed from the file extension]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increase the log level (-v info, -vv debug)"),
        )
}

// Start from the configuration file and apply the command line overrides.
fn build_config(matches: &ArgMatches) -> Result<Config, IpolError> {
    let mut config = Config::load(matches.value_of("config").map(Path::new))?;
    if let Some(v) = matches.value_of("time_column") {
        config.time_attribute = v.to_owned();
    }
    if let Some(v) = matches.value_of("keyword") {
        config.channel_keyword = v.to_owned();
    }
    if let Some(v) = matches.value_of("unit") {
        config.unit = v.to_owned();
    }
    if let Some(v) = matches.value_of("precision") {
        config.precision = v
            .parse::<usize>()
            .map_err(|e| IpolError::Config(format!("precision [{}]: {}", v, e)))?;
    }
    if let Some(v) = matches.value_of("delimiter") {
        let mut chars = v.chars();
        config.delimiter = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ if v == "\\t" => Some('\t'),
            _ => {
                return Err(IpolError::Config(format!(
                    "The delimiter [{}] must be a single character",
                    v
                )))
            }
        };
    }
    config.normalized()
}

fn write_line(term: &Term, line: &str) -> Result<(), IpolError> {
    term.write_line(line)
        .map_err(|e| IpolError::Terminal(e.to_string()))
}

// Answer a single query. Returns false when no value could be given.
fn answer(
    term: &Term,
    prepared: &PreparedSeries,
    time: f64,
    config: &Config,
    json: bool,
) -> Result<bool, IpolError> {
    match prepared.query(time) {
        Ok(res) => {
            for line in render(&res, config, json)? {
                let line = if json {
                    line
                } else {
                    style(line).green().to_string()
                };
                write_line(term, &line)?;
            }
            Ok(true)
        }
        Err(e) if e.is_warning() => {
            warn!("{}", e);
            write_line(term, &style(e.to_string()).yellow().to_string())?;
            write_line(
                term,
                &style("Could not calculate the torque. Please check your input and data.")
                    .yellow()
                    .to_string(),
            )?;
            Ok(false)
        }
        Err(e) => {
            error!("{}", e);
            write_line(term, &style(e.to_string()).red().to_string())?;
            Ok(false)
        }
    }
}

fn interactive(
    term: &Term,
    prepared: &PreparedSeries,
    config: &Config,
    json: bool,
) -> Result<(), IpolError> {
    loop {
        let ans = question(term, "Enter time in seconds (e.g., 5.812)")?;
        if is_quit(&ans) {
            return Ok(());
        }
        match parse_time(&ans) {
            Ok(time) => {
                answer(term, prepared, time, config, json)?;
            }
            Err(e) => {
                write_line(term, &style(e.to_string()).red().to_string())?;
            }
        }
    }
}

async fn run(matches: &ArgMatches<'_>) -> Result<bool, IpolError> {
    let config = build_config(matches)?;
    info!("Configuration:\n{}", config);

    let input = matches
        .value_of("input")
        .ok_or_else(|| IpolError::Logic("An input file is required".to_owned()))?;
    let series = load_series(PathBuf::from(input), &config).await?;

    let term = Term::stdout();
    if matches.is_present("preview") {
        let n = match matches.value_of("preview") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|e| IpolError::Config(format!("preview [{}]: {}", v, e)))?,
            None => 5,
        };
        term.write_str(&preview(&series, n))
            .map_err(|e| IpolError::Terminal(e.to_string()))?;
    }

    let prepared = config.engine().prepare(&series)?;
    info!("Channels: {:?}", prepared.channels());
    let json = matches.is_present("json");

    match matches.values_of("time") {
        Some(values) => {
            let mut all_ok = true;
            for v in values {
                let time = parse_time(v)?;
                all_ok &= answer(&term, &prepared, time, &config, json)?;
            }
            Ok(all_ok)
        }
        None => {
            interactive(&term, &prepared, &config, json)?;
            Ok(true)
        }
    }
}

#[async_std::main]
async fn main() {
    let matches = build_app().get_matches();
    let level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Unable to initialize the logger: {}", e);
    }

    match run(&matches).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", style(e.to_string()).red());
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let matches = build_app().get_matches_from(vec![
            "torque_ipol",
            "data.csv",
            "--config",
            "/this/path/does/not/exist.json",
        ]);
        assert!(matches!(build_config(&matches), Err(IpolError::FileNotFound(_))));

        let matches = build_app().get_matches_from(vec![
            "torque_ipol",
            "data.csv",
            "--time-column",
            "Time (ms)",
            "-k",
            "Force",
            "-p",
            "3",
            "-d",
            ";",
            "-t",
            "1.5",
            "-t",
            "-0.5",
        ]);
        let config = build_config(&matches).unwrap();
        assert_eq!(config.time_attribute, "time_ms");
        assert_eq!(config.channel_keyword, "force");
        assert_eq!(config.precision, 3);
        assert_eq!(config.delimiter, Some(';'));
        let times: Vec<&str> = matches.values_of("time").unwrap().collect();
        assert_eq!(times, vec!["1.5", "-0.5"]);
    }

    #[test]
    fn cli_time_takes_one_value() {
        let matches = build_app().get_matches_from(vec![
            "torque_ipol",
            "-t",
            "1",
            "-t",
            "2",
            "data.csv",
        ]);
        let times: Vec<&str> = matches.values_of("time").unwrap().collect();
        assert_eq!(times, vec!["1", "2"]);
        assert_eq!(matches.value_of("input"), Some("data.csv"));

        let res = build_app().get_matches_from_safe(vec!["torque_ipol", "-t", "1", "2", "data.csv"]);
        assert!(res.is_err());
    }

    #[test]
    fn cli_rejects_bad_values() {
        let matches =
            build_app().get_matches_from(vec!["torque_ipol", "data.csv", "-p", "two"]);
        assert!(matches!(build_config(&matches), Err(IpolError::Config(_))));
        let matches =
            build_app().get_matches_from(vec!["torque_ipol", "data.csv", "-d", ";;"]);
        assert!(matches!(build_config(&matches), Err(IpolError::Config(_))));
    }
}
