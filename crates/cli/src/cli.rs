use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "grid")]
#[command(about = "Grid operator tool - poke a worker from the command line")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check worker liveness with the bounded-retry health policy
    Probe {
        #[command(flatten)]
        worker: WorkerArgs,

        /// Probe attempts before declaring the worker unresponsive
        #[arg(long, default_value_t = 3)]
        attempts: u32,

        /// Delay between attempts, in milliseconds
        #[arg(long = "delay-ms", default_value_t = 500)]
        delay_ms: u64,
    },

    /// Send a raw driver command, holding a lease for the duration
    Forward {
        #[command(flatten)]
        worker: WorkerArgs,

        /// Command fields; repeat a FIELD to send multiple values
        #[arg(value_name = "FIELD=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Best-effort: tell the worker to end a session
    Terminate {
        #[command(flatten)]
        worker: WorkerArgs,

        /// Session identifier to terminate
        #[arg(long)]
        session: String,
    },
}

#[derive(Args, Debug)]
pub struct WorkerArgs {
    /// Worker host
    #[arg(long)]
    pub host: String,

    /// Worker port
    #[arg(long, default_value_t = 5555)]
    pub port: u16,

    /// Capability tag the worker was registered under
    #[arg(long, default_value = "*")]
    pub environment: String,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn probe_parses_with_defaults() {
        let cli = Cli::try_parse_from(["grid", "probe", "--host", "rc1"]).unwrap();

        match cli.command {
            Command::Probe {
                worker,
                attempts,
                delay_ms,
            } => {
                assert_eq!(worker.host, "rc1");
                assert_eq!(worker.port, 5555);
                assert_eq!(worker.environment, "*");
                assert_eq!(attempts, 3);
                assert_eq!(delay_ms, 500);
            }
            other => panic!("expected probe, got {other:?}"),
        }
    }

    #[test]
    fn forward_requires_at_least_one_field() {
        assert!(Cli::try_parse_from(["grid", "forward", "--host", "rc1"]).is_err());

        let cli = Cli::try_parse_from([
            "grid", "forward", "--host", "rc1", "cmd=click", "sessionId=s1",
        ])
        .unwrap();
        match cli.command {
            Command::Forward { fields, .. } => {
                assert_eq!(fields, vec!["cmd=click", "sessionId=s1"]);
            }
            other => panic!("expected forward, got {other:?}"),
        }
    }

    #[test]
    fn terminate_requires_session() {
        assert!(Cli::try_parse_from(["grid", "terminate", "--host", "rc1"]).is_err());
        assert!(
            Cli::try_parse_from(["grid", "terminate", "--host", "rc1", "--session", "s1"])
                .is_ok()
        );
    }
}
