use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::outcome::Outcome;
use crate::pipeline::process_document_use_case::{DocumentReport, ProcessDocumentUseCase};
use crate::pipeline::user_workspace::UserWorkspace;
use crate::pipeline::verify_otp_use_case::{OtpReport, VerifyOtpUseCase};

/// One unit of work, addressed by user identifier.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum VerificationRequest {
    Document { user: String },
    Otp { user: String, pin: String },
}

impl VerificationRequest {
    pub fn user(&self) -> &str {
        match self {
            VerificationRequest::Document { user } | VerificationRequest::Otp { user, .. } => user,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "request", content = "outcome", rename_all = "snake_case")]
pub enum VerificationResponse {
    Document(Outcome<DocumentReport>),
    Otp(Outcome<OtpReport>),
}

impl VerificationResponse {
    /// Failure response for a request that never reached its use case.
    pub fn failed(request: &VerificationRequest, kind: &str, message: &str) -> Self {
        let user = request.user().to_string();
        match request {
            VerificationRequest::Document { .. } => {
                VerificationResponse::Document(Outcome::failed(user, kind, message))
            }
            VerificationRequest::Otp { .. } => {
                VerificationResponse::Otp(Outcome::failed(user, kind, message))
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            VerificationResponse::Document(outcome) => outcome.is_ok(),
            VerificationResponse::Otp(outcome) => outcome.is_ok(),
        }
    }
}

/// Handles requests one at a time. Each worker owns its own handler.
pub trait RequestHandler: Send {
    fn handle(&mut self, request: &VerificationRequest) -> VerificationResponse;
}

/// Both use cases bound to a directory of per-user workspaces.
pub struct VerificationServices {
    users_dir: PathBuf,
    document: ProcessDocumentUseCase,
    otp: VerifyOtpUseCase,
}

impl VerificationServices {
    pub fn new(users_dir: PathBuf, document: ProcessDocumentUseCase, otp: VerifyOtpUseCase) -> Self {
        Self {
            users_dir,
            document,
            otp,
        }
    }

    pub fn process_document(&mut self, user: &str) -> Outcome<DocumentReport> {
        let workspace = UserWorkspace::for_user(&self.users_dir, user);
        Outcome::from_result(user, self.document.execute(&workspace))
    }

    pub fn verify_otp(&mut self, user: &str, pin: &str) -> Outcome<OtpReport> {
        let workspace = UserWorkspace::for_user(&self.users_dir, user);
        Outcome::from_result(user, self.otp.execute(&workspace, pin))
    }
}

impl RequestHandler for VerificationServices {
    fn handle(&mut self, request: &VerificationRequest) -> VerificationResponse {
        match request {
            VerificationRequest::Document { user } => {
                VerificationResponse::Document(self.process_document(user))
            }
            VerificationRequest::Otp { user, pin } => {
                VerificationResponse::Otp(self.verify_otp(user, pin))
            }
        }
    }
}
