//! Application entry point — SpeakPerfect terminal practice session.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the word-challenge list (custom JSON file, or built-in).
//! 4. Build the evaluation client ([`ApiEvaluationClient`]) from config.
//! 5. Create pipeline channels (`command`, `event`) and spawn the
//!    [`AttemptRunner`].
//! 6. Spawn the stdin thread (Enter stops the current recording early).
//! 7. Walk the challenge list: record, evaluate, show the verdict.
//! 8. Print the session summary.

use std::io::{BufRead, Write as _};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use speak_perfect::{
    audio::{CaptureController, MicSource},
    config::AppConfig,
    eval::{ApiEvaluationClient, EvaluationResult},
    pipeline::{new_shared_state, AttemptCommand, AttemptEvent, AttemptRunner, SharedState},
    words::{builtin_challenges, WordChallenge},
};

// ---------------------------------------------------------------------------
// Level-bar rendering
// ---------------------------------------------------------------------------

/// Redraw the visualizer bars in place on the current terminal line.
fn draw_levels(state: &SharedState) {
    let bars: String = {
        let st = match state.lock() {
            Ok(st) => st,
            Err(_) => return,
        };
        st.levels
            .bars()
            .iter()
            .map(|&m| match (m * 8.0) as u32 {
                0 => ' ',
                1 => '\u{2581}',
                2 => '\u{2582}',
                3 => '\u{2583}',
                4 => '\u{2584}',
                5 => '\u{2585}',
                6 => '\u{2586}',
                7 => '\u{2587}',
                _ => '\u{2588}',
            })
            .collect()
    };
    print!("\r  listening  [{bars}]  (Enter to stop)");
    let _ = std::io::stdout().flush();
}

// ---------------------------------------------------------------------------
// One challenge
// ---------------------------------------------------------------------------

/// Drive a single challenge to completion and return the result, or `None`
/// when the attempt failed (the error is already printed).
async fn play_challenge(
    challenge: &WordChallenge,
    state: &SharedState,
    command_tx: &mpsc::Sender<AttemptCommand>,
    event_rx: &mut mpsc::Receiver<AttemptEvent>,
) -> Option<EvaluationResult> {
    println!();
    println!(
        "Say: {}  {}  [{}]",
        challenge.word,
        challenge.phonetic,
        challenge.difficulty.label()
    );
    println!("  {}", challenge.definition);

    if command_tx
        .send(AttemptCommand::Begin {
            target_word: challenge.word.clone(),
        })
        .await
        .is_err()
    {
        return None;
    }

    let mut redraw = tokio::time::interval(Duration::from_millis(80));

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                match event {
                    Some(AttemptEvent::RecordingStarted { .. }) => {}
                    Some(AttemptEvent::ClipReady { duration_secs }) => {
                        println!("\r  recorded {duration_secs:.1}s, checking...          ");
                    }
                    Some(AttemptEvent::Evaluated { result }) => {
                        let verdict = if result.is_correct { "correct" } else { "try again" };
                        println!("  score {}/100 ({verdict})", result.score);
                        println!("  heard as {}", result.phonetic_match);
                        println!("  {}", result.feedback);
                        return Some(result);
                    }
                    Some(AttemptEvent::Failed { message }) => {
                        println!("\r  {message}                              ");
                        return None;
                    }
                    None => return None,
                }
            }
            _ = redraw.tick() => {
                let recording = state
                    .lock()
                    .map(|st| st.attempt == speak_perfect::pipeline::AttemptState::Recording)
                    .unwrap_or(false);
                if recording {
                    draw_levels(state);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::info!("SpeakPerfect starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Word list
    let challenges = match &config.word_list {
        Some(path) => WordChallenge::load_from_file(path)?,
        None => builtin_challenges(),
    };
    if challenges.is_empty() {
        anyhow::bail!("the word list is empty");
    }

    // 4. Evaluation client and capture controller
    let evaluator = Arc::new(ApiEvaluationClient::from_config(&config.evaluation));
    let controller = CaptureController::new(MicSource, config.capture.clone());

    // 5. Pipeline runner
    let state = new_shared_state(config.capture.level_bars);
    let runner = AttemptRunner::new(Arc::clone(&state), controller, evaluator);

    let (command_tx, command_rx) = mpsc::channel::<AttemptCommand>(16);
    let (event_tx, mut event_rx) = mpsc::channel::<AttemptEvent>(32);
    let runner_task = tokio::spawn(runner.run(command_rx, event_tx));

    // 6. stdin thread: each Enter press requests an early stop.  Stop with
    //    no active attempt is ignored by the runner, so stray presses are
    //    harmless.
    {
        let stop_tx = command_tx.clone();
        std::thread::Builder::new()
            .name("stdin-stop".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    if line.is_err() || stop_tx.blocking_send(AttemptCommand::Stop).is_err() {
                        break;
                    }
                }
            })?;
    }

    println!("SpeakPerfect: pronounce each word, pause when done.");
    println!("Recording stops after {}ms of silence, or press Enter.", config.capture.silence_hold_ms);

    // 7. Challenge loop
    let mut results: Vec<(String, Option<EvaluationResult>)> = Vec::new();
    for challenge in &challenges {
        let result = play_challenge(challenge, &state, &command_tx, &mut event_rx).await;
        results.push((challenge.word.clone(), result));
    }

    drop(command_tx);
    let _ = runner_task.await;

    // 8. Session summary
    println!();
    println!("Session summary");
    let mut total = 0u32;
    let mut scored = 0u32;
    let mut correct = 0u32;
    for (word, result) in &results {
        match result {
            Some(r) => {
                total += u32::from(r.score);
                scored += 1;
                if r.is_correct {
                    correct += 1;
                }
                let mark = if r.is_correct { "+" } else { "-" };
                println!("  {mark} {word:<22} {:>3}/100", r.score);
            }
            None => println!("  ? {word:<22} (no result)"),
        }
    }
    if scored > 0 {
        println!(
            "{correct}/{scored} correct, average score {}",
            total / scored
        );
    }

    Ok(())
}
