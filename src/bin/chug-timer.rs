//! Terminal stopwatch that times a chug and submits it to a Chug Board server.

#[cfg(feature = "timer-cli")]
mod cli {
    use std::{io::Write, path::PathBuf};

    use anyhow::{Context, bail};
    use chug_board_back::timing::{Stopwatch, TimingMode};
    use clap::Parser;
    use reqwest::multipart::{Form, Part};
    use serde::Deserialize;
    use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
    use tracing::{debug, info};
    use uuid::Uuid;

    #[derive(Parser)]
    #[command(name = "chug-timer")]
    #[command(about = "Time a chug and post it to the leaderboard", long_about = None)]
    #[command(version)]
    struct Cli {
        /// Base URL of the server.
        #[arg(long, env = "CHUG_BOARD_URL", default_value = "http://localhost:8080")]
        server: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        beer: Option<String>,

        /// `Glass` or `Can`.
        #[arg(short, long, default_value = "Glass")]
        method: String,

        #[arg(short, long)]
        party: Option<Uuid>,

        /// Image file attached to the attempt.
        #[arg(long)]
        photo: Option<PathBuf>,

        /// Seconds typed in by hand instead of using the stopwatch.
        #[arg(long)]
        manual: Option<f64>,

        /// Measure without submitting.
        #[arg(long)]
        dry_run: bool,
    }

    #[derive(Deserialize)]
    struct Created {
        attempt: CreatedAttempt,
        warnings: Vec<String>,
    }

    #[derive(Deserialize)]
    struct CreatedAttempt {
        rank: usize,
        attempt_number: usize,
        display_time: String,
        sub_three: bool,
    }

    type StdinLines = Lines<BufReader<Stdin>>;

    async fn wait_for_enter(lines: &mut StdinLines, prompt: &str) -> anyhow::Result<()> {
        println!("{prompt}");
        lines
            .next_line()
            .await
            .context("reading stdin")?
            .context("stdin closed")?;
        Ok(())
    }

    async fn measure(stopwatch: &mut Stopwatch) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        wait_for_enter(&mut lines, "Press Enter to start.").await?;
        stopwatch.start()?;

        let mut rx = stopwatch.subscribe();
        let display = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let elapsed = *rx.borrow_and_update();
                print!("\r{elapsed:>7.2} s");
                let _ = std::io::stdout().flush();
            }
        });

        let stopped = wait_for_enter(&mut lines, "Press Enter to stop.").await;
        let elapsed = stopwatch.stop()?;
        display.abort();
        stopped?;
        println!("\r{elapsed:>7.2} s");
        Ok(())
    }

    fn photo_mime(path: &std::path::Path) -> &'static str {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("heic") => "image/heic",
            _ => "application/octet-stream",
        }
    }

    async fn submit(cli: &Cli, time: f64) -> anyhow::Result<Created> {
        let mut form = Form::new()
            .text("name", cli.name.clone())
            .text("time", time.to_string())
            .text("method", cli.method.clone());
        if let Some(beer) = &cli.beer {
            form = form.text("beer_type", beer.clone());
        }
        if let Some(party) = cli.party {
            form = form.text("partyId", party.to_string());
        }
        if let Some(path) = &cli.photo {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading photo {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("photo")
                .to_owned();
            form = form.part(
                "image",
                Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(photo_mime(path))?,
            );
        }

        let url = format!("{}/api/attempts", cli.server.trim_end_matches('/'));
        debug!(%url, "submitting attempt");
        let response = reqwest::Client::new()
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("posting to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("server rejected the attempt ({status}): {body}");
        }
        response.json().await.context("decoding server response")
    }

    pub async fn run() -> anyhow::Result<()> {
        let cli = Cli::parse();
        let mut stopwatch = Stopwatch::new();

        match cli.manual {
            Some(seconds) => stopwatch.set_manual(seconds)?,
            None => {
                stopwatch.set_mode(TimingMode::Automatic)?;
                measure(&mut stopwatch).await?;
            }
        }

        let Some(time) = stopwatch.reading() else {
            bail!("no time recorded");
        };

        if cli.dry_run {
            info!(time, "dry run; not submitting");
            return Ok(());
        }

        let created = submit(&cli, time).await?;
        let attempt = created.attempt;
        println!(
            "{} recorded {} s: rank #{}, attempt #{}{}",
            cli.name,
            attempt.display_time,
            attempt.rank,
            attempt.attempt_number,
            if attempt.sub_three { " (sub-3!)" } else { "" }
        );
        for warning in created.warnings {
            println!("warning: {warning}");
        }
        Ok(())
    }
}

#[cfg(feature = "timer-cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}

#[cfg(not(feature = "timer-cli"))]
fn main() {
    eprintln!("chug-timer was built without the `timer-cli` feature");
    std::process::exit(1);
}
