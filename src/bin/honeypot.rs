use std::sync::Arc;
use anyhow::Result;
use honeypot::config::HoneypotConfig;
use honeypot::servers::honeypot::HoneypotState;

#[tokio::main]
async fn main() -> Result<()> {
    let mut conf_file: Option<String> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("Usage: honeypot [--conf FILE]");
                return Ok(());
            }
            "--conf" => {
                if i + 1 < args.len() {
                    i += 1;
                    conf_file = Some(args[i].clone());
                } else {
                    eprintln!("Error: --conf requires a FILE argument");
                    std::process::exit(2);
                }
            }
            other => eprintln!("Warning: ignoring unknown argument {other}"),
        }
        i += 1;
    }

    let config = match &conf_file {
        Some(path) => HoneypotConfig::from_file(path)?,
        None => HoneypotConfig::default(),
    };

    honeypot::logging::init(config.log_file.as_deref());

    let bind = config.bind_addr();
    tracing::info!("[honeypot] [starting] Starting SSH honeypot server on {}...", bind);

    let listener = match HoneypotState::bind(&bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("[honeypot] [startup_failed] {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("[honeypot] [ready] addr={}", bind);

    let state = Arc::new(HoneypotState::new(&config));
    HoneypotState::run_until(state, listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("[honeypot] no ctrl-c handler, serving until killed err={}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;
    Ok(())
}
