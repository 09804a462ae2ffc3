use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::channel,
        Arc,
    },
    time::{Duration, Instant},
};
use structopt::StructOpt;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;

mod angle;
mod classifier;
mod config;
mod counter;
mod engine;
mod error;
mod event;
mod extract;
mod features;
mod frame;
mod pose;
mod stability;
mod stats;
mod throttle;

use classifier::DenseClassifier;
use event::Event;
use stability::PostureLabel;
use stats::{SessionStats, Snapshot};

const PACING_SLICE: Duration = Duration::from_millis(50);

fn describe(label: PostureLabel) -> &'static str {
    match label {
        PostureLabel::GoodForm => "good form",
        PostureLabel::BadForm => "bad form",
        PostureLabel::Stand | PostureLabel::Unknown => "squat!",
    }
}

fn present(event: &Event, pb: Option<&ProgressBar>) {
    let (label, snapshot) = match event.status() {
        Some(status) => status,
        None => return,
    };

    if let Some(pb) = pb {
        pb.set_message(format!(
            "{} | squats: {} | correct: {:.1}% | goal: {:.1}%",
            describe(label),
            snapshot.squat_count,
            snapshot.correct_pct,
            snapshot.goal_pct,
        ));
        if let Event::Classified { .. } = event {
            pb.inc(1);
        }
    }
}

#[derive(structopt::StructOpt)]
struct Opt {
    /// Recorded pose-source output, one JSON frame per line. A line
    /// `{"reset": true}` starts a new session. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Path to a dense posture model. Without one only joint angles are computed.
    #[structopt(short, long)]
    model: Option<PathBuf>,

    /// Replay frames at their recorded pace, keeping only the newest frame
    /// when the pipeline falls behind.
    #[structopt(short, long)]
    realtime: bool,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,

    #[structopt(flatten)]
    config: config::Config,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let config = opt.config;
    let mut engine = match opt.model.as_ref().map(DenseClassifier::from_path) {
        Some(Ok(classifier)) => engine::Engine::with_classifier(config, classifier),
        Some(Err(e)) => {
            error!(
                message = "classifier unavailable, counting disabled",
                error = %e
            );
            engine::Engine::new(config)
        }
        None => engine::Engine::new(config),
    };
    if engine.is_degraded() {
        warn!(message = "running without a classifier, only joint angles are computed");
    }

    let reader: Box<dyn BufRead + Send> = match opt.input.as_ref() {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {:?}", path))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let pb = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let (frames_tx, frames_rx) = frame::latest();
    let (events_tx, events_rx) = channel();

    let realtime = opt.realtime;
    let running_read = running.clone();
    let running_process = running;

    let (snapshot, stats, timing) = crossbeam::thread::scope(|scope| -> Result<_> {
        let reader_thread = scope.spawn(move |_| -> Result<usize> {
            let mut pacer = frame::Pacer::default();
            let mut discarded = 0;

            for (line_number, line) in reader.lines().enumerate() {
                if !running_read.load(Ordering::SeqCst) {
                    break;
                }

                let line = line.context("failed reading frame")?;
                if line.trim().is_empty() {
                    continue;
                }
                let delivery = match serde_json::from_str::<frame::Record>(&line) {
                    Ok(record) => frame::Delivery::from(record),
                    Err(e) => {
                        warn!(message = "skipping malformed frame", line = line_number + 1, error = %e);
                        continue;
                    }
                };
                if delivery.is_empty() {
                    continue;
                }

                if realtime {
                    if let Some(frame) = delivery.frame.as_ref() {
                        let due = pacer.due(frame.timestamp(), Instant::now());
                        while running_read.load(Ordering::SeqCst) {
                            let now = Instant::now();
                            if now >= due {
                                break;
                            }
                            std::thread::sleep((due - now).min(PACING_SLICE));
                        }
                    }
                    discarded += frames_tx.send(delivery, frame::Delivery::coalesce);
                } else {
                    frames_tx.send_lossless(delivery);
                }
            }

            Ok(discarded)
        });

        let process_thread = scope.spawn(move |_| {
            let mut events_tx = events_tx;
            // drained after Ctrl-C too: the reader may be blocked on a full slot
            for delivery in frames_rx.iter() {
                if running_process.load(Ordering::SeqCst) {
                    engine.deliver(&delivery, &mut events_tx);
                }
            }
            if engine.counter().in_down_phase() {
                info!(message = "stream ended in the middle of a rep");
            }
            engine.shutdown();
            (engine.snapshot(), engine.stats(), engine.timing)
        });

        for event in events_rx {
            present(&event, pb.as_ref());
        }

        let discarded = reader_thread
            .join()
            .map_err(|_| anyhow!("frame reader panicked"))??;
        if discarded > 0 {
            info!(message = "discarded stale frames", discarded);
        }

        process_thread
            .join()
            .map_err(|_| anyhow!("pipeline worker panicked"))
    })
    .map_err(|_| anyhow!("pipeline threads panicked"))??;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    print_summary(&snapshot, &stats, &timing);
    Ok(())
}

fn print_summary(snapshot: &Snapshot, stats: &SessionStats, timing: &engine::Timing) {
    let model_fps = if timing.inference.as_secs_f64() > 0.0 {
        timing.inferences as f64 / timing.inference.as_secs_f64()
    } else {
        0.0
    };

    println!("squats:        {}", snapshot.squat_count);
    println!(
        "classified:    {} attempts, {} correct, {} wrong ({:.1}% correct)",
        stats.total_attempts, snapshot.correct_count, snapshot.wrong_count, stats.correct_pct
    );
    println!("goal progress: {:.1}%", stats.goal_pct);
    println!(
        "frames:        {} ({} classified, model {:.1} fps)",
        timing.frames, timing.inferences, model_fps
    );
}
