use std::thread::sleep;
use std::time::Duration;

/// Run `op` up to `attempts` times, sleeping `backoff` between attempts.
/// The last error is returned when every attempt fails.
pub fn with_retry<T, E, F>(attempts: usize, backoff: Duration, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt < attempts {
                    log::warn!("attempt {}/{} failed with {}, trying again", attempt, attempts, err);
                    sleep(backoff);
                }
                last_err = Some(err);
            }
        }
    }

    Err(last_err.expect("at least one attempt was made"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_first_success() {
        let mut calls = 0;
        let result: Result<i32, String> = with_retry(3, Duration::ZERO, || {
            calls += 1;
            if calls < 2 {
                Err("transient".to_string())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_gives_up_after_attempts() {
        let mut calls = 0;
        let result: Result<(), String> = with_retry(3, Duration::ZERO, || {
            calls += 1;
            Err("still broken".to_string())
        });
        assert_eq!(result.unwrap_err(), "still broken");
        assert_eq!(calls, 3);
    }
}
