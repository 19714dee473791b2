use serde::Serialize;

use crate::shared::error::VerificationError;

/// Serialized response for one request.
///
/// `failed` means processing could not complete. A completed OTP check
/// whose PIN or liveness did not match is still `ok`, with `valid: false`
/// in the result.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok { user: String, result: T },
    Failed { user: String, kind: String, message: String },
}

impl<T> Outcome<T> {
    pub fn from_result(user: impl Into<String>, result: Result<T, VerificationError>) -> Self {
        let user = user.into();
        match result {
            Ok(result) => Outcome::Ok { user, result },
            Err(e) => {
                log::warn!("Request for {user} failed: {e}");
                Outcome::failed(user, e.kind(), &e.to_string())
            }
        }
    }

    pub fn failed(user: impl Into<String>, kind: &str, message: &str) -> Self {
        Outcome::Failed {
            user: user.into(),
            kind: kind.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Report {
        valid: bool,
    }

    #[test]
    fn test_ok_serializes_with_status() {
        let outcome = Outcome::from_result("u1", Ok(Report { valid: false }));
        assert!(outcome.is_ok());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["user"], "u1");
        assert_eq!(json["result"]["valid"], false);
    }

    #[test]
    fn test_failure_carries_kind_and_message() {
        let outcome: Outcome<Report> = Outcome::from_result("u2", Err(VerificationError::NoTextFound));
        assert!(!outcome.is_ok());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "no_text_found");
        assert_eq!(json["message"], "no meaningful text found in document");
    }
}
