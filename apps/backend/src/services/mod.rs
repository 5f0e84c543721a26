pub mod drill;
pub mod genai;
