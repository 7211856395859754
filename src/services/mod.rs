pub mod gemini;
pub mod reply;
pub mod telegram;
