use async_trait::async_trait;
use log::warn;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

/// Consulted after a draft fails, before the batch moves on.
#[async_trait]
pub trait FailurePrompt: Send + Sync {
    async fn decide(&self, item_number: usize, reason: &str) -> Decision;
}

/// Never interrupts the batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysContinue;

#[async_trait]
impl FailurePrompt for AlwaysContinue {
    async fn decide(&self, _item_number: usize, _reason: &str) -> Decision {
        Decision::Continue
    }
}

/// Asks the operator on the terminal. Anything but an explicit "n" continues.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

#[async_trait]
impl FailurePrompt for StdinPrompt {
    async fn decide(&self, item_number: usize, reason: &str) -> Decision {
        let question = format!(
            "Draft #{} failed: {}\nContinue with the next draft? [Y/n] ",
            item_number, reason
        );
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stdout = io::stdout();
            stdout.write_all(question.as_bytes())?;
            stdout.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => parse_answer(&line),
            Ok(Err(e)) => {
                warn!("[prompt] could not read answer, continuing: {}", e);
                Decision::Continue
            }
            Err(e) => {
                warn!("[prompt] prompt task failed, continuing: {}", e);
                Decision::Continue
            }
        }
    }
}

fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "no" | "stop" | "q" => Decision::Stop,
        _ => Decision::Continue,
    }
}
