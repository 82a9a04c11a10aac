mod cli_arguments;

use std::{process::ExitCode, sync::Arc, time::Duration};

use bytes::Bytes;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use butter::{Dispatcher, EndpointBody, HttpEndpoint, ReqwestTransport};

use crate::cli_arguments::CliArguments;

fn endpoint(args: &CliArguments) -> HttpEndpoint {
    let mut endpoint = HttpEndpoint::new(args.host.clone(), args.path.clone())
        .with_scheme(args.scheme.clone())
        .with_method(args.method);

    for (name, value) in &args.query {
        endpoint = endpoint.with_query_item(name.clone(), value.clone());
    }
    for (name, value) in &args.headers {
        endpoint = endpoint.with_header(name.clone(), value.clone());
    }

    if let Some(body) = &args.body {
        endpoint = endpoint.with_body(match serde_json::from_str(body) {
            Ok(json) => EndpointBody::Json(json),
            Err(_) => EndpointBody::Raw(Bytes::from(body.clone())),
        });
    }

    endpoint
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: CliArguments = CliArguments::parse();

    let transport = match ReqwestTransport::with_timeout(Duration::from_secs(args.timeout_secs)) {
        Ok(transport) => transport,
        Err(err) => {
            error!("Could not create HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = Dispatcher::new(Arc::new(transport));
    if let Some(strategy) = args.decoding_strategy() {
        dispatcher.set_decoding_strategy(strategy);
    }

    let (tx, mut rx) = oneshot::channel();
    dispatcher.make_request::<serde_json::Value, _>(&endpoint(&args), move |result| {
        let _ = tx.send(result);
    });

    let outcome = tokio::select! {
        outcome = &mut rx => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, cancelling request");
            dispatcher.cancel();
            rx.await
        }
    };

    match outcome {
        Ok(Ok(value)) => {
            info!("Request completed");
            match serde_json::to_string_pretty(&value) {
                Ok(pretty) => println!("{pretty}"),
                Err(err) => println!("{value}: {err}"),
            }
            ExitCode::SUCCESS
        }
        Ok(Err(err)) => {
            error!("Request failed: {err}");
            ExitCode::FAILURE
        }
        Err(_) => {
            error!("Request was dropped before completing");
            ExitCode::FAILURE
        }
    }
}
