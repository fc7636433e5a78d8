use crate::channel::{Channel, ChannelError};
use crate::service::QuestionAnswerer;

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

#[must_use]
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(input))
}

/// Question loop: read a question, answer it, repeat until exit or end of input.
///
/// A failed question is reported on the channel and the loop keeps going.
///
/// # Errors
///
/// Returns an error only when the channel itself fails.
pub async fn run_session<C: Channel>(
    channel: &mut C,
    answerer: &dyn QuestionAnswerer,
) -> Result<(), ChannelError> {
    while let Some(message) = channel.recv().await? {
        let question = message.text.trim();
        if is_exit_command(question) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        match answerer.ask(question).await {
            Ok(answer) => channel.send_answer(&answer).await?,
            Err(e) => {
                tracing::warn!("question failed: {e}");
                channel.send_error(&e.to_string()).await?;
            }
        }
    }
    tracing::debug!("session ended");
    Ok(())
}
