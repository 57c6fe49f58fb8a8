use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;

/// Default API root of a locally running Vertex server.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:6130/api";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the Vertex API, including the API path prefix.
    #[arg(long, env = "VERTEX_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Bearer token for an existing session. When set, no login is performed.
    #[arg(long, env = "VERTEX_TOKEN")]
    token: Option<String>,

    /// Credentials to log in with (format: username:password). Ignored when
    /// a token is provided.
    #[arg(long, env = "VERTEX_CREDENTIALS")]
    credentials: Option<String>,

    /// Event stream paths to watch, relative to the API base URL.
    #[arg(long, env = "VERTEX_STREAMS", value_delimiter = ',', default_value = "/events")]
    pub streams: Vec<String>,

    /// Named events to print from each stream.
    #[arg(long, env = "VERTEX_EVENTS", value_delimiter = ',', default_value = "message,update")]
    pub events: Vec<String>,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env = "VERTEX_LOG_LEVEL",
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn credentials(&self) -> Option<String> {
        self.credentials.clone()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_a_local_vertex() {
        let config = Config::try_parse_from(["vertex-watch"]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.streams, vec!["/events".to_string()]);
        assert_eq!(
            config.events,
            vec!["message".to_string(), "update".to_string()]
        );
        assert_eq!(config.log_level_filter, LevelFilter::Info);
        assert_eq!(config.token(), None);
        assert_eq!(config.credentials(), None);
    }

    #[test]
    fn test_stream_and_event_lists_split_on_commas() {
        let config = Config::try_parse_from([
            "vertex-watch",
            "--streams",
            "/events,/instances/abc/events",
            "--events",
            "status_change",
        ])
        .unwrap();
        assert_eq!(config.streams.len(), 2);
        assert_eq!(config.streams[1], "/instances/abc/events");
        assert_eq!(config.events, vec!["status_change".to_string()]);
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        assert!(Config::try_parse_from(["vertex-watch", "--log-level-filter", "LOUD"]).is_err());
    }
}
