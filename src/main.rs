use std::path::PathBuf;

use anyhow::{bail, Context};

use charprompt::config::AppConfig;
use charprompt::core::prompt::{Enhancer, GenerationRequest, PromptEngine};

const USAGE: &str = "usage: charprompt <request.json> [--enhance]";

struct CliArgs {
    request_path: PathBuf,
    enhance: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut request_path = None;
    let mut enhance = false;
    for arg in args {
        match arg.as_str() {
            "--enhance" => enhance = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            _ if request_path.is_none() => request_path = Some(PathBuf::from(arg.as_str())),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }
    let request_path = request_path.context(USAGE)?;
    Ok(CliArgs {
        request_path,
        enhance,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log_guard = charprompt::core::logging::init();
    tracing::info!("charprompt v{} starting", charprompt::VERSION);

    let args = parse_args(std::env::args().skip(1))?;
    let config = AppConfig::load();

    let raw = std::fs::read_to_string(&args.request_path)
        .with_context(|| format!("reading {}", args.request_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw).context("parsing request JSON")?;
    let has_model = value.get("model").is_some();
    let mut request: GenerationRequest =
        serde_json::from_value(value).context("decoding generation request")?;
    if !has_model {
        request.model = config.generation.default_model;
    }

    let data = config.data_cache().context("loading data cache")?;
    let engine = PromptEngine::new(data);
    let mut rng = rand::thread_rng();

    let result = if args.enhance || config.enhancement.enabled {
        let enhancer = Enhancer::from_config(&config.enhancement);
        engine.generate_enhanced(&request, &mut rng, &enhancer).await
    } else {
        engine.generate(&request, &mut rng)
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
