use std::path::{Path, PathBuf};

use crate::shared::constants::{
    CORRECTED_IMAGE_FILE, DOCUMENT_FACE_FILE, DOCUMENT_IMAGE_FILE, LIVENESS_SCRATCH_DIR,
    VIDEO_DIR, VIDEO_FILE,
};

/// Per-user storage directory, named by the user identifier.
///
/// ```text
/// <root>/
///   id_proof.jpg
///   Processed_ID_Card_Best_angle.jpg
///   Extracted_ID_Face.jpg
///   recorded_videos/live_recording.mp4
///   face_valid/face_<frame>.jpg
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserWorkspace {
    root: PathBuf,
}

impl UserWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace for `user_id` under a directory holding all users.
    pub fn for_user(base: &Path, user_id: &str) -> Self {
        Self::new(base.join(user_id))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path component, used to label results.
    pub fn user_id(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    pub fn document_image(&self) -> PathBuf {
        self.root.join(DOCUMENT_IMAGE_FILE)
    }

    pub fn corrected_image(&self) -> PathBuf {
        self.root.join(CORRECTED_IMAGE_FILE)
    }

    pub fn document_face(&self) -> PathBuf {
        self.root.join(DOCUMENT_FACE_FILE)
    }

    pub fn video(&self) -> PathBuf {
        self.root.join(VIDEO_DIR).join(VIDEO_FILE)
    }

    pub fn liveness_scratch_dir(&self) -> PathBuf {
        self.root.join(LIVENESS_SCRATCH_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let ws = UserWorkspace::for_user(Path::new("/data/users"), "u42");
        assert_eq!(ws.user_id(), "u42");
        assert_eq!(ws.document_image(), PathBuf::from("/data/users/u42/id_proof.jpg"));
        assert_eq!(
            ws.corrected_image(),
            PathBuf::from("/data/users/u42/Processed_ID_Card_Best_angle.jpg")
        );
        assert_eq!(
            ws.document_face(),
            PathBuf::from("/data/users/u42/Extracted_ID_Face.jpg")
        );
        assert_eq!(
            ws.video(),
            PathBuf::from("/data/users/u42/recorded_videos/live_recording.mp4")
        );
        assert_eq!(ws.liveness_scratch_dir(), PathBuf::from("/data/users/u42/face_valid"));
    }

    #[test]
    fn test_user_id_of_bare_root() {
        assert_eq!(UserWorkspace::new("/").user_id(), "/");
    }
}
