//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// geolocate - IP geolocation with provider fallback
#[derive(Parser, Debug)]
#[command(name = "geolocate")]
#[command(version)]
#[command(about = "IP geolocation with provider fallback", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands; `serve` when none is given
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen address, overriding GEOLOCATE_LISTEN_ADDR
        #[arg(long)]
        listen: Option<String>,
    },

    /// Look up IP addresses and print where they are
    Lookup {
        /// IP addresses to look up
        #[arg(required = true)]
        ips: Vec<String>,

        /// Ask only this provider instead of the default fallback order
        #[arg(long, short = 'p')]
        provider: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["geolocate"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_with_listen() {
        let cli = Cli::try_parse_from(["geolocate", "serve", "--listen", "127.0.0.1:8000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Serve {
                listen: Some("127.0.0.1:8000".to_string())
            })
        );
    }

    #[test]
    fn test_lookup_many_ips() {
        let cli = Cli::try_parse_from(["geolocate", "lookup", "8.8.8.8", "1.1.1.1"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Lookup {
                ips: vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()],
                provider: None,
                json: false,
            })
        );
    }

    #[test]
    fn test_lookup_with_provider_and_json() {
        let cli =
            Cli::try_parse_from(["geolocate", "lookup", "-p", "ipstack", "--json", "8.8.8.8"])
                .unwrap();
        match cli.command {
            Some(Commands::Lookup { ips, provider, json }) => {
                assert_eq!(ips, vec!["8.8.8.8"]);
                assert_eq!(provider.as_deref(), Some("ipstack"));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_lookup_requires_an_ip() {
        assert!(Cli::try_parse_from(["geolocate", "lookup"]).is_err());
    }
}
