//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Hybrid vector + BM25 retrieval over a JSON-lines corpus.
#[derive(Parser, Debug)]
#[command(name = "ragrank", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "RAGRANK_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank corpus documents against a query.
    Query {
        /// Query text.
        text: String,

        /// Number of results (defaults to `scoring.parameters.k`).
        #[arg(short, long)]
        k: Option<usize>,

        /// JSON-lines corpus file (defaults to `corpus.path`).
        #[arg(long)]
        corpus: Option<String>,

        /// Ranking strategy: hybrid, vector, lexical or bm25.
        #[arg(short, long)]
        strategy: Option<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Load the corpus and print index statistics.
    Inspect {
        /// JSON-lines corpus file (defaults to `corpus.path`).
        #[arg(long)]
        corpus: Option<String>,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "scoring.hybrid.vector_weight").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "scoring.parameters.k").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["ragrank"]);
        assert!(args.config.is_none());
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_flags() {
        let args = CliArgs::parse_from(["ragrank", "--verbose", "--config", "/tmp/r.toml"]);
        assert!(args.verbose);
        assert!(!args.quiet);
        assert_eq!(args.config, Some("/tmp/r.toml".to_string()));
    }

    #[test]
    fn test_query_command_defaults() {
        let args = CliArgs::parse_from(["ragrank", "query", "rate limiting"]);
        match args.command {
            Some(Command::Query {
                text,
                k,
                corpus,
                strategy,
                json,
            }) => {
                assert_eq!(text, "rate limiting");
                assert!(k.is_none());
                assert!(corpus.is_none());
                assert!(strategy.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_query_command_options() {
        let args = CliArgs::parse_from([
            "ragrank",
            "query",
            "upstream",
            "-k",
            "8",
            "--corpus",
            "docs.jsonl",
            "--strategy",
            "bm25",
            "--json",
        ]);
        match args.command {
            Some(Command::Query {
                k,
                corpus,
                strategy,
                json,
                ..
            }) => {
                assert_eq!(k, Some(8));
                assert_eq!(corpus.as_deref(), Some("docs.jsonl"));
                assert_eq!(strategy.as_deref(), Some("bm25"));
                assert!(json);
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_inspect_command() {
        let args = CliArgs::parse_from(["ragrank", "inspect", "--corpus", "c.jsonl"]);
        match args.command {
            Some(Command::Inspect { corpus }) => {
                assert_eq!(corpus.as_deref(), Some("c.jsonl"));
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["ragrank", "version"]);
        assert!(matches!(args.command, Some(Command::Version)));
    }

    // ------------------------------------------------------------------------
    // Config command tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_get_command() {
        let args = CliArgs::parse_from(["ragrank", "config", "get", "scoring.type"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Get { key },
            })) => assert_eq!(key, "scoring.type"),
            _ => panic!("Expected Config Get command"),
        }
    }

    #[test]
    fn test_config_set_command() {
        let args = CliArgs::parse_from(["ragrank", "config", "set", "scoring.parameters.k", "8"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Set { key, value },
            })) => {
                assert_eq!(key, "scoring.parameters.k");
                assert_eq!(value, "8");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_config_init_force() {
        let args = CliArgs::parse_from(["ragrank", "config", "init", "--force"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Init { file, force },
            })) => {
                assert!(file.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_config_export_docker_env() {
        let args = CliArgs::parse_from(["ragrank", "config", "export", "--docker-env"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Export { docker_env },
            })) => assert!(docker_env),
            _ => panic!("Expected Config Export command"),
        }
    }
}
