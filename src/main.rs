use std::{net::TcpListener, path::PathBuf, process::ExitCode, sync::Arc};

use actix_web::web;
use clap::{Args, Parser, Subcommand};
use hookprobe::application::probe_service::{
    build_probe_request, load_payload_file, webhook_probe::WebhookProbe, ProbeOverrides,
};
use hookprobe::common::configuration::{get_configuration, Settings};
use hookprobe::common::telemetry::{get_subscriber, init_tracing_subscriber};
use hookprobe::domain::models::{payload::SessionStatus, probe::ProbeVariant};
use hookprobe::infrastructure::persistence::{inmemory::InMemoryDeliveryStore, DeliveryStore};
use hookprobe::infrastructure::web::{startup::run, SinkSettings};

#[derive(Parser)]
#[command(name = "hookprobe", version, about = "Webhook smoke-testing probe and local sink")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deliver one synthetic payload to a configured webhook target
    Probe(ProbeArgs),
    /// Run the local webhook sink
    Serve,
}

#[derive(Args)]
struct ProbeArgs {
    #[arg(value_enum)]
    variant: ProbeVariant,
    /// Overrides the configured target url
    #[arg(long)]
    url: Option<String>,
    /// JSON file sent instead of the built-in payload
    #[arg(long)]
    payload_file: Option<PathBuf>,
    #[arg(long)]
    session_id: Option<String>,
    #[arg(long)]
    status: Option<String>,
    /// Send --payload-file contents even if they do not match the variant's schema
    #[arg(long)]
    no_validate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Command::Probe(_) => "warn",
        Command::Serve => "info",
    };
    let subscriber = get_subscriber("hookprobe".into(), default_filter.into(), std::io::stderr);
    init_tracing_subscriber(subscriber);

    let configuration = match get_configuration() {
        Ok(configuration) => configuration,
        Err(err) => {
            println!("❌ Failed to read configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Probe(args) => probe(args, &configuration).await,
        Command::Serve => match serve(configuration).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                println!("❌ Webhook sink stopped: {}", err);
                ExitCode::FAILURE
            }
        },
    }
}

async fn probe(args: ProbeArgs, configuration: &Settings) -> ExitCode {
    let payload = match args.payload_file.as_deref().map(load_payload_file).transpose() {
        Ok(payload) => payload,
        Err(err) => {
            println!("❌ {}", err);
            return ExitCode::FAILURE;
        }
    };

    let overrides = ProbeOverrides {
        url: args.url,
        payload,
        session_id: args.session_id,
        status: args.status.map(SessionStatus::from),
        skip_validation: args.no_validate,
    };
    let target = args.variant.target(&configuration.targets);

    let request = match build_probe_request(args.variant, target, overrides) {
        Ok(request) => request,
        Err(err) => {
            println!("❌ {}", err);
            return ExitCode::FAILURE;
        }
    };
    let webhook_probe = match WebhookProbe::new() {
        Ok(webhook_probe) => webhook_probe,
        Err(err) => {
            println!("❌ {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Sending {} probe to {} ({} bytes)",
        args.variant,
        request.endpoint(),
        request.content_length()
    );
    let outcome = webhook_probe.deliver(&request).await;
    println!("{}", outcome);

    ExitCode::from(outcome.exit_code())
}

async fn serve(configuration: Settings) -> Result<(), std::io::Error> {
    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Webhook sink listening on {}", address);

    let store: Arc<dyn DeliveryStore> = Arc::new(InMemoryDeliveryStore::default());
    let sink_settings = SinkSettings {
        shared_secret: configuration.application.shared_secret,
    };

    run(listener, web::Data::from(store), sink_settings)?.await
}
