use crate::shared::frame::Frame;

/// Domain interface for optical character recognition.
///
/// Returns the recognised text fragments in reading order. Implementations
/// may hold an engine handle between calls, hence `&mut self`.
pub trait TextRecognizer: Send {
    fn recognize(&mut self, image: &Frame) -> Result<Vec<String>, Box<dyn std::error::Error>>;
}
