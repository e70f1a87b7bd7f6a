use flowrate::{ControlInput, ControlValue};
use std::io::BufRead;

/// Parses one line of control input. Blank lines are skipped.
pub fn parse_control_line(line: &str) -> Option<Result<ControlValue, core::num::ParseIntError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse())
}

/// Feeds control values from `reader` into `control` on a plain OS thread.
///
/// A detached thread rather than a Tokio task: a read blocked on stdin must
/// not keep the runtime alive at exit. The thread ends at end of input or
/// once the control input is closed.
pub fn spawn_control_reader<R>(reader: R, control: ControlInput) -> std::io::Result<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("control-input".to_string())
        .spawn(move || read_control(reader, &control))?;
    Ok(())
}

fn read_control<R>(reader: R, control: &ControlInput)
where
    R: BufRead,
{
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "unable to read control input");
                break;
            }
        };

        match parse_control_line(&line) {
            None => {}
            Some(Ok(value)) => {
                if control.set(value).is_err() {
                    tracing::debug!("control input closed, ignoring further lines");
                    return;
                }
                tracing::info!(control_ns = value, "control value updated");
            }
            Some(Err(e)) => {
                tracing::warn!(line = %line.trim(), error = %e, "ignoring invalid control value");
            }
        }
    }

    tracing::debug!("control input reached end of stream");
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowrate::control_channel;

    #[test]
    fn parses_signed_nanoseconds() {
        assert_eq!(parse_control_line(" 2500 \n"), Some(Ok(2500)));
        assert_eq!(parse_control_line("-1"), Some(Ok(-1)));
        assert_eq!(parse_control_line("   "), None);
        assert!(matches!(parse_control_line("fast"), Some(Err(_))));
    }

    #[test]
    fn last_valid_line_wins() {
        let (control, mut rx) = control_channel(0);
        let input = "100\n\nnot-a-number\n300\n";
        read_control(input.as_bytes(), &control);

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 300);
    }

    #[test]
    fn stops_once_control_is_closed() {
        let (control, rx) = control_channel(0);
        control.close();
        read_control("5\n6\n".as_bytes(), &control);
        assert_eq!(*rx.borrow(), 0);
    }
}
