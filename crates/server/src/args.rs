//! Command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::{value_parser, Arg, ArgMatches, Command};

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerArgs {
    pub address: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
    pub locale: String,
    pub max_elems: usize,
    pub snapshot_interval: Duration,
}

/// Build the argument tree.
pub fn build_cli() -> Command {
    Command::new("typeaheadd")
        .about("Namespaced prefix-autocomplete server")
        .arg(
            Arg::new("address")
                .short('a')
                .long("address")
                .help("Listen address")
                .default_value("0.0.0.0"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Listen port")
                .value_parser(value_parser!(u16))
                .default_value("8080"),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .help("Snapshot directory; omit to run in-memory only")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("locale")
                .short('l')
                .long("locale")
                .help("Default locale for key folding")
                .default_value("en_US"),
        )
        .arg(
            Arg::new("max-elems")
                .long("max-elems")
                .help("Per-namespace entry cap")
                .value_parser(value_parser!(usize))
                .default_value("1000"),
        )
        .arg(
            Arg::new("snapshot-interval")
                .long("snapshot-interval")
                .help("Seconds between snapshot passes")
                .value_parser(value_parser!(u64))
                .default_value("60"),
        )
}

/// Parse the process arguments.
pub fn parse() -> ServerArgs {
    from_matches(&build_cli().get_matches())
}

fn from_matches(matches: &ArgMatches) -> ServerArgs {
    ServerArgs {
        address: matches.get_one::<String>("address").unwrap().clone(),
        port: *matches.get_one::<u16>("port").unwrap(),
        data_dir: matches.get_one::<PathBuf>("data-dir").cloned(),
        locale: matches.get_one::<String>("locale").unwrap().clone(),
        max_elems: *matches.get_one::<usize>("max-elems").unwrap(),
        snapshot_interval: Duration::from_secs(
            *matches.get_one::<u64>("snapshot-interval").unwrap(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(argv: &[&str]) -> ServerArgs {
        from_matches(&build_cli().try_get_matches_from(argv).unwrap())
    }

    #[test]
    fn defaults() {
        let args = parse_from(&["typeaheadd"]);
        assert_eq!(args.address, "0.0.0.0");
        assert_eq!(args.port, 8080);
        assert_eq!(args.data_dir, None);
        assert_eq!(args.locale, "en_US");
        assert_eq!(args.max_elems, 1000);
        assert_eq!(args.snapshot_interval, Duration::from_secs(60));
    }

    #[test]
    fn short_flags() {
        let args = parse_from(&[
            "typeaheadd",
            "-a",
            "127.0.0.1",
            "-p",
            "9090",
            "-d",
            "/var/lib/typeahead",
            "-l",
            "de",
        ]);
        assert_eq!(args.address, "127.0.0.1");
        assert_eq!(args.port, 9090);
        assert_eq!(args.data_dir, Some(PathBuf::from("/var/lib/typeahead")));
        assert_eq!(args.locale, "de");
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(build_cli()
            .try_get_matches_from(["typeaheadd", "-p", "not-a-port"])
            .is_err());
    }
}
