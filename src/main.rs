use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use chatrelay::connector::api::Router;
use chatrelay::{Commands, Container, ContainerConfig, HttpServer, HttpServerConfig};

#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON settings document
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[arg(long, global = true, default_value = "uploads")]
    upload_dir: PathBuf,

    /// Answer from a local echo provider instead of calling Groq
    #[arg(long, global = true)]
    mock_provider: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        config_path: cli.config,
        upload_dir: cli.upload_dir,
        mock_provider: cli.mock_provider,
    })
    .await?;

    match cli.command {
        Commands::Serve {
            port,
            public,
            frontend_origin,
            cleanup_interval_minutes,
            max_upload_age_hours,
        } => {
            let container = Arc::new(container);

            if cleanup_interval_minutes > 0 {
                spawn_upload_cleanup(
                    Arc::clone(&container),
                    Duration::from_secs(cleanup_interval_minutes * 60),
                    Duration::from_secs(max_upload_age_hours * 3600),
                );
            }

            let host = if public {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            };
            info!("Allowed CORS origins: {}", frontend_origin.join(", "));

            HttpServer::new(
                container,
                HttpServerConfig {
                    addr: SocketAddr::new(host, port),
                    allowed_origins: frontend_origin,
                },
            )
            .serve()
            .await?;
        }
        command => {
            let router = Router::new(&container);
            let output = router.route(command).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

fn spawn_upload_cleanup(container: Arc<Container>, every: Duration, max_age: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match container.cleanup_use_case(max_age).execute().await {
                Ok(0) => {}
                Ok(removed) => info!("Upload cleanup removed {} file(s)", removed),
                Err(e) => warn!("Upload cleanup failed: {}", e),
            }
        }
    });
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["chatrelay", "serve"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.upload_dir, PathBuf::from("uploads"));
        match cli.command {
            Commands::Serve {
                cleanup_interval_minutes,
                max_upload_age_hours,
                public,
                ..
            } => {
                assert_eq!(cleanup_interval_minutes, 60);
                assert_eq!(max_upload_age_hours, 24);
                assert!(!public);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn frontend_origins_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "chatrelay",
            "serve",
            "--frontend-origin",
            "http://a.test,http://b.test",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                frontend_origin, ..
            } => assert_eq!(frontend_origin, vec!["http://a.test", "http://b.test"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chatrelay",
            "cleanup",
            "--max-age-hours",
            "2",
            "--mock-provider",
            "--config",
            "alt.json",
        ])
        .unwrap();
        assert!(cli.mock_provider);
        assert_eq!(cli.config, PathBuf::from("alt.json"));
        assert!(matches!(cli.command, Commands::Cleanup { max_age_hours: 2 }));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["chatrelay", "index", "."]).is_err());
    }
}
