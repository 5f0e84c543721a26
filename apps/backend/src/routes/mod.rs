pub mod history;
pub mod sessions;
pub mod study;
pub mod vocabulary;
