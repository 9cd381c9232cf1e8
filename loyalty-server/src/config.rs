//! Process configuration. Every key can come from the environment; the
//! matching flag takes precedence when both are set.

use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "loyalty-server", version, about = "Loyalty points backend")]
pub struct Config {
    /// Address and port to listen on.
    #[arg(short = 'a', long, env = "RUN_ADDRESS", default_value = "0.0.0.0:8080")]
    pub run_address: String,

    /// PostgreSQL connection string.
    #[arg(short = 'd', long, env = "DATABASE_URI")]
    pub database_uri: String,

    /// Base URL of the accrual service.
    #[arg(
        short = 'r',
        long,
        env = "ACCRUAL_SYSTEM_ADDRESS",
        default_value = "http://localhost:8090"
    )]
    pub accrual_system_address: String,

    /// HMAC key for signing auth tokens.
    #[arg(short = 'j', long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    /// Auth token lifetime.
    #[arg(
        short = 'e',
        long,
        env = "JWT_EXP",
        default_value = "1h",
        value_parser = humantime::parse_duration
    )]
    pub jwt_exp: Duration,

    /// Interval between pending-order reconciliation ticks.
    #[arg(
        long,
        env = "ACCRUAL_POLL_INTERVAL",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    pub accrual_poll_interval: Duration,

    /// Number of accrual polling workers.
    #[arg(long, env = "ACCRUAL_WORKERS", default_value_t = 10)]
    pub accrual_workers: usize,

    /// Bound of the reconciliation work queue.
    #[arg(long, env = "ACCRUAL_QUEUE_CAPACITY", default_value_t = 100)]
    pub accrual_queue_capacity: usize,
}
