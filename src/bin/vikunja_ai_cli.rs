//! vikunja-ai: drive a Vikunja instance with natural-language instructions.
//!
//! Usage:
//!   vikunja-ai run <instruction...>      Translate and execute, print result items
//!   vikunja-ai plan <instruction...>     Print the validated request without executing it
//!   vikunja-ai test-credentials          Check the OpenAI API key
//!   vikunja-ai schema                    Print the function-call schema sent to the model

use anyhow::Context;
use std::path::PathBuf;
use vikunja_ai::transport::HttpTransport;
use vikunja_ai::{schema, OpenAiClient, Translator, TranslatorBuilder, TranslatorConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]).await,
        "plan" => cmd_plan(&args[2..]).await,
        "test-credentials" => cmd_test_credentials(&args[2..]).await,
        "schema" => cmd_schema(),
        "version" | "--version" | "-V" => {
            println!("vikunja-ai {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if e.downcast_ref::<vikunja_ai::Error>().is_some_and(|e| e.is_transient()) {
            eprintln!("The service reported a temporary condition; try again later.");
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"vikunja-ai: natural-language control for Vikunja

USAGE:
    vikunja-ai <COMMAND> [--config <path>] [ARGS]

COMMANDS:
    run <instruction...>        Translate the instruction, call Vikunja, print result items
    plan <instruction...>       Translate and validate only; print the request
    test-credentials            Check the OpenAI API key (GET /models)
    schema                      Print the vikunja_request function definition
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    VIKUNJA_AI_OPENAI_API_KEY   OpenAI API key (falls back to OPENAI_API_KEY)
    VIKUNJA_AI_OPENAI_BASE_URL  OpenAI-compatible base URL
    VIKUNJA_AI_MODEL            Chat model name
    VIKUNJA_AI_VIKUNJA_URL      Vikunja API base, e.g. https://tasks.example.com/api/v1
    VIKUNJA_AI_VIKUNJA_TOKEN    Vikunja API token
    VIKUNJA_AI_MAX_ATTEMPTS     Model calls per instruction (1-5, default 1)
    VIKUNJA_AI_HTTP_TIMEOUT_SECS  Per-request HTTP timeout in seconds (default 30)
    VIKUNJA_AI_PROXY_URL        HTTP(S) proxy for both services
    RUST_LOG                    Log filter, e.g. vikunja_ai=debug"#
    );
}

/// Splits `--config <path>` off the remaining arguments.
fn split_config(args: &[String]) -> anyhow::Result<(Option<PathBuf>, Vec<String>)> {
    let mut config = None;
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().context("--config needs a path")?;
            config = Some(PathBuf::from(path));
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((config, rest))
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<TranslatorConfig> {
    let config = match path {
        Some(path) => TranslatorConfig::from_yaml_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TranslatorConfig::default(),
    };
    Ok(config.apply_env())
}

fn build_translator(config: &TranslatorConfig) -> anyhow::Result<Translator> {
    Ok(TranslatorBuilder::from_config(config)?.build()?)
}

/// The instruction is forwarded as given; an empty one is legal.
fn instruction_from(rest: &[String]) -> String {
    rest.join(" ")
}

async fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let (config_path, rest) = split_config(args)?;
    let instruction = instruction_from(&rest);
    let translator = build_translator(&load_config(config_path)?)?;

    let items = translator.translate_and_execute(&instruction).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

async fn cmd_plan(args: &[String]) -> anyhow::Result<()> {
    let (config_path, rest) = split_config(args)?;
    let instruction = instruction_from(&rest);
    let translator = build_translator(&load_config(config_path)?)?;

    let request = translator.plan(&instruction).await?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

async fn cmd_test_credentials(args: &[String]) -> anyhow::Result<()> {
    let (config_path, _) = split_config(args)?;
    let config = load_config(config_path)?;
    let transport = HttpTransport::new(&config.transport_config())?;
    let client = OpenAiClient::new(transport, config.openai_credentials()?);

    client.test_credentials().await?;
    println!("OpenAI credentials OK ({})", client.credentials().base_url());
    Ok(())
}

fn cmd_schema() -> anyhow::Result<()> {
    let function = schema::vikunja_request_function();
    println!("{}", serde_json::to_string_pretty(&function)?);
    Ok(())
}
