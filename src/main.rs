use anyhow::Result;
use proctored_interview::Config;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load("config/proctored-interview")?;

    info!("Proctored Interview v0.1.0");
    info!("Interviewer service: {}", cfg.interviewer.base_url);
    info!(
        "Audio: {} Hz, {} channel(s), VAD threshold {}",
        cfg.audio.sample_rate, cfg.audio.channels, cfg.audio.vad_threshold
    );
    info!(
        "Proctoring: {} strikes to disqualify, notices every {}s",
        cfg.proctor.violation_limit, cfg.proctor.notice_interval_secs
    );
    info!("This component runs embedded in the recruiting dashboard");

    Ok(())
}
