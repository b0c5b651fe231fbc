use anyhow::{bail, Context, Result};
use std::io::Read;

use origin_check_lib::models::{CheckRequest, FixRequest};
use origin_check_lib::services::config_store::{load_default_config, ConfigStore, Credential};
use origin_check_lib::{init_logging, OriginCheck};

const USAGE: &str = "Usage:
  origin-check check [text]   score text against the web (reads stdin when text is omitted)
  origin-check fix [text]     suggest an original rewrite of a sentence or passage
  origin-check config set-key <name> <value>
  origin-check config delete-key <name>
                              store or remove a key (google, google_cx, watsonx, watsonx_project)

Credentials come from GOOGLE_API_KEY / GOOGLE_CX and WATSONX_API_KEY / WATSONX_PROJECT_ID,
or from the apiKeys section of the config file.";

fn read_input(args: &[String]) -> Result<String> {
    if args.len() > 2 {
        return Ok(args[2..].join(" "));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("read text from stdin")?;
    Ok(buf)
}

fn run_config(args: &[String]) -> Result<()> {
    let store = ConfigStore::new(
        ConfigStore::default_config_dir().context("no config directory on this platform")?,
    );
    let name = args.get(3).context("missing key name")?;
    let credential = Credential::from_config_key(name)
        .with_context(|| format!("unknown key '{}'", name))?;

    match args.get(2).map(String::as_str) {
        Some("set-key") => {
            let value = args.get(4).context("missing key value")?;
            store
                .set_credential(credential, value)
                .map_err(anyhow::Error::msg)?;
            eprintln!("Stored {}", name);
        }
        Some("delete-key") => {
            store.delete_credential(credential).map_err(anyhow::Error::msg)?;
            eprintln!("Removed {}", name);
        }
        _ => bail!("expected set-key or delete-key\n\n{}", USAGE),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1).map(String::as_str) else {
        eprintln!("{}", USAGE);
        return Ok(());
    };
    if command == "--help" || command == "-h" {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    init_logging();
    if command == "config" {
        return run_config(&args);
    }

    let config = load_default_config();
    let app = OriginCheck::from_config(&config);

    let output = match command {
        "check" => {
            let text = read_input(&args)?;
            match app.check_text(CheckRequest { text }).await {
                Ok(result) => serde_json::to_string_pretty(&result)?,
                Err(e) => serde_json::to_string_pretty(&e)?,
            }
        }
        "fix" => {
            let text = read_input(&args)?;
            match app.fix_text(FixRequest { text }).await {
                Ok(result) => serde_json::to_string_pretty(&result)?,
                Err(e) => serde_json::to_string_pretty(&e)?,
            }
        }
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    };

    println!("{}", output);
    Ok(())
}
